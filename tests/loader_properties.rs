use std::sync::Arc;

use loadscope::application::filter::{FieldKey, KeyFilter, TableKey, ViewKey};
use loadscope::application::repos::RepoError;
use loadscope::application::schema::SchemaService;
use loadscope::cache::{CacheConfig, CacheContext, Loaders, context};
use loadscope::domain::entities::{FieldRecord, TableRecord, ViewRecord};
use loadscope::domain::types::{FieldType, ResourceKind, ViewType};
use loadscope::infra::memory::InMemoryRepositories;

fn field(id: &str, table_id: &str, field_type: FieldType, order: f64) -> FieldRecord {
    FieldRecord::new(id, table_id, id, field_type, order)
}

fn ids<T>(items: &[T], id_of: impl Fn(&T) -> &str) -> Vec<String> {
    items.iter().map(|item| id_of(item).to_string()).collect()
}

fn field_ids(items: &[FieldRecord]) -> Vec<String> {
    ids(items, |field| field.id.as_str())
}

fn setup() -> (Arc<InMemoryRepositories>, Loaders) {
    let repos = Arc::new(InMemoryRepositories::new());
    let loaders = Loaders::new(Arc::clone(&repos), &CacheConfig::default());
    (repos, loaders)
}

fn unit_of_work() -> Arc<CacheContext> {
    Arc::new(CacheContext::from_config(&CacheConfig::default()))
}

#[tokio::test]
async fn unfiltered_loads_reach_the_store_once_per_parent() {
    let (repos, loaders) = setup();
    repos.insert_field(field("f1", "t1", FieldType::Number, 0.0));
    repos.insert_field(field("f2", "t1", FieldType::Date, 1.0));

    let (first, second) = context::scope(unit_of_work(), async {
        let first = loaders.fields.load("t1", None).await.expect("first load");
        let second = loaders.fields.load("t1", None).await.expect("second load");
        (first, second)
    })
    .await;

    assert_eq!(first, second);
    assert_eq!(field_ids(&first), ["f1", "f2"]);
    assert_eq!(repos.field_parent_queries(), 1);
}

#[tokio::test]
async fn filtered_first_load_still_caches_the_full_set() {
    let (repos, loaders) = setup();
    repos.insert_field(field("num", "t1", FieldType::Number, 0.0));
    repos.insert_field(field("date", "t1", FieldType::Date, 1.0));
    repos.insert_field(field("text", "t1", FieldType::SingleLineText, 2.0));
    let unit = unit_of_work();

    let (numbers, dates) = context::scope(Arc::clone(&unit), async {
        let numbers = KeyFilter::new().allow(FieldKey::Type, [FieldType::Number]);
        let dates = KeyFilter::new().allow(FieldKey::Type, [FieldType::Date]);
        (
            loaders
                .fields
                .load("t1", Some(&numbers))
                .await
                .expect("filtered load"),
            loaders
                .fields
                .load("t1", Some(&dates))
                .await
                .expect("second filtered load"),
        )
    })
    .await;

    assert_eq!(field_ids(&numbers), ["num"]);
    assert_eq!(field_ids(&dates), ["date"]);
    assert_eq!(repos.field_parent_queries(), 1);

    let state = unit.fields().snapshot();
    assert!(state.is_full("t1"));
    assert_eq!(state.len(), 3);
}

#[tokio::test]
async fn empty_allow_list_excludes_everything() {
    let (repos, loaders) = setup();
    repos.insert_field(field("f1", "t1", FieldType::Number, 0.0));
    repos.insert_field(field("f2", "t1", FieldType::Date, 1.0));

    let none = KeyFilter::new().allow(FieldKey::Type, Vec::<FieldType>::new());
    let any = KeyFilter::new().unconstrained(FieldKey::Type);

    let (cached_none, cached_any) = context::scope(unit_of_work(), async {
        (
            loaders.fields.load("t1", Some(&none)).await.expect("empty list"),
            loaders.fields.load("t1", Some(&any)).await.expect("unconstrained"),
        )
    })
    .await;
    assert!(cached_none.is_empty());
    assert_eq!(cached_any.len(), 2);

    // Same answer when the store evaluates the filter.
    let uncached = loaders.fields.load("t1", Some(&none)).await.expect("uncached");
    assert!(uncached.is_empty());
}

#[tokio::test]
async fn repeated_invalidation_is_idempotent() {
    let (repos, loaders) = setup();
    repos.insert_field(field("f1", "t1", FieldType::Number, 0.0));
    repos.insert_field(field("g1", "t2", FieldType::Number, 0.0));
    let once = unit_of_work();
    let twice = unit_of_work();

    for (unit, rounds) in [(Arc::clone(&once), 1), (Arc::clone(&twice), 2)] {
        context::scope(unit, async {
            loaders.fields.load("t1", None).await.expect("load t1");
            loaders.fields.load("t2", None).await.expect("load t2");
            for _ in 0..rounds {
                loaders.fields.invalidate_tables(["t1"]);
            }
        })
        .await;
    }

    let once = once.fields().snapshot();
    let twice = twice.fields().snapshot();
    for state in [&once, &twice] {
        assert!(!state.is_full("t1"));
        assert!(state.is_full("t2"));
        assert!(!state.contains("f1"));
        assert!(state.contains("g1"));
    }
    assert_eq!(once.len(), twice.len());
}

#[tokio::test]
async fn invalidating_unknown_tables_or_outside_a_unit_is_a_no_op() {
    let (repos, loaders) = setup();
    repos.insert_field(field("f1", "t1", FieldType::Number, 0.0));
    let unit = unit_of_work();

    loaders.fields.invalidate_tables(["t1"]);

    context::scope(Arc::clone(&unit), async {
        loaders.fields.load("t1", None).await.expect("load");
        loaders.fields.invalidate_tables(["never-loaded"]);
        loaders.fields.invalidate_tables(Vec::<String>::new());
    })
    .await;

    assert!(unit.fields().snapshot().is_full("t1"));
}

#[tokio::test]
async fn loads_are_sorted_by_order() {
    let (repos, loaders) = setup();
    repos.insert_table(TableRecord::new("c", "b1", "Three", 3.0));
    repos.insert_table(TableRecord::new("a", "b1", "One", 1.0));
    repos.insert_table(TableRecord::new("b", "b1", "Two", 2.0));

    let (miss, hit) = context::scope(unit_of_work(), async {
        (
            loaders.tables.load("b1", None).await.expect("miss"),
            loaders.tables.load("b1", None).await.expect("hit"),
        )
    })
    .await;

    assert_eq!(ids(&miss, |t| t.id.as_str()), ["a", "b", "c"]);
    assert_eq!(ids(&hit, |t| t.id.as_str()), ["a", "b", "c"]);
    assert_eq!(repos.table_parent_queries(), 1);
}

#[tokio::test]
async fn load_by_ids_fetches_only_uncached_ids() {
    let (repos, loaders) = setup();
    repos.insert_field(field("a", "t1", FieldType::Number, 0.0));
    repos.insert_field(field("b", "t1", FieldType::Number, 1.0));

    let items = context::scope(unit_of_work(), async {
        loaders.fields.load_by_ids(&["a"]).await.expect("warm a");
        loaders.fields.load_by_ids(&["a", "b"]).await.expect("load a and b")
    })
    .await;

    assert_eq!(field_ids(&items), ["a", "b"]);
    assert_eq!(
        repos.id_requests(ResourceKind::Field),
        vec![vec!["a".to_string()], vec!["b".to_string()]]
    );
}

#[tokio::test]
async fn full_load_forgets_children_deleted_after_an_id_lookup() {
    let (repos, loaders) = setup();
    repos.insert_field(field("x", "t1", FieldType::Number, 0.0));
    repos.insert_field(field("y", "t1", FieldType::Number, 1.0));
    let unit = unit_of_work();

    let (miss, hit) = context::scope(Arc::clone(&unit), async {
        loaders.fields.load_by_ids(&["x"]).await.expect("load x by id");
        assert!(repos.delete_field("x"));
        (
            loaders.fields.load("t1", None).await.expect("miss"),
            loaders.fields.load("t1", None).await.expect("hit"),
        )
    })
    .await;

    assert_eq!(field_ids(&miss), ["y"]);
    assert_eq!(miss, hit);
    assert!(!unit.fields().snapshot().contains("x"));
    assert_eq!(repos.field_parent_queries(), 1);
}

#[tokio::test]
async fn load_by_ids_drops_ids_the_store_does_not_know() {
    let (repos, loaders) = setup();
    repos.insert_view(ViewRecord::new("a", "t1", "Grid", ViewType::Grid, 0.0));

    let cached = context::scope(unit_of_work(), async {
        loaders.views.load_by_ids(&["a", "missing"]).await.expect("cached")
    })
    .await;
    let uncached = loaders
        .views
        .load_by_ids(&["a", "missing"])
        .await
        .expect("uncached");

    assert_eq!(ids(&cached, |v| v.id.as_str()), ["a"]);
    assert_eq!(ids(&uncached, |v| v.id.as_str()), ["a"]);
}

#[tokio::test]
async fn deleting_a_table_forgets_its_cached_fields() {
    let (repos, loaders) = setup();
    repos.insert_table(TableRecord::new("T1", "b1", "Projects", 0.0));
    repos.insert_field(field("f2", "T1", FieldType::Date, 1.0));
    repos.insert_field(field("f1", "T1", FieldType::Number, 0.0));
    let service = SchemaService::new(repos.clone(), Arc::new(loaders));
    let unit = unit_of_work();

    context::scope(Arc::clone(&unit), async {
        let first = service.loaders().fields.load("T1", None).await.expect("first");
        assert_eq!(field_ids(&first), ["f1", "f2"]);
        assert_eq!(repos.field_parent_queries(), 1);

        let second = service.loaders().fields.load("T1", None).await.expect("second");
        assert_eq!(first, second);
        assert_eq!(repos.field_parent_queries(), 1);

        service.delete_table("T1").await.expect("delete table");
    })
    .await;

    let state = unit.fields().snapshot();
    assert!(!state.is_full("T1"));
    assert!(!state.contains("f1"));
    assert!(!state.contains("f2"));
}

#[tokio::test]
async fn disabled_kinds_always_query_the_store() {
    let repos = Arc::new(InMemoryRepositories::new());
    repos.insert_view(ViewRecord::new("v1", "t1", "Board", ViewType::Kanban, 0.0));
    let loaders = Loaders::new(Arc::clone(&repos), &CacheConfig::disabled());
    let unit = Arc::new(CacheContext::from_config(&CacheConfig::disabled()));

    let filter = KeyFilter::new().allow(ViewKey::Type, [ViewType::Kanban]);
    context::scope(Arc::clone(&unit), async {
        for _ in 0..3 {
            let views = loaders.views.load("t1", Some(&filter)).await.expect("load");
            assert_eq!(views.len(), 1);
        }
        assert!(!loaders.views.is_enabled());
    })
    .await;

    assert_eq!(repos.view_parent_queries(), 3);
    assert!(unit.views().snapshot().is_empty());
}

#[tokio::test]
async fn table_filters_match_on_database_name() {
    let (repos, loaders) = setup();
    let mut orders = TableRecord::new("t1", "b1", "Orders", 0.0);
    orders.db_table_name = "bse_orders".to_string();
    repos.insert_table(orders);
    repos.insert_table(TableRecord::new("t2", "b1", "Customers", 1.0));

    let filter = KeyFilter::new().allow(TableKey::DbTableName, ["bse_orders"]);
    let tables = context::scope(unit_of_work(), async {
        loaders.tables.load("b1", Some(&filter)).await.expect("load")
    })
    .await;

    assert_eq!(ids(&tables, |t| t.id.as_str()), ["t1"]);
}

#[tokio::test]
async fn empty_parent_id_is_invalid_input() {
    let (repos, loaders) = setup();

    let err = context::scope(unit_of_work(), async { loaders.fields.load("", None).await })
        .await
        .expect_err("empty parent id");

    assert!(matches!(err, RepoError::InvalidInput { .. }));
    assert_eq!(repos.field_parent_queries(), 0);
}
