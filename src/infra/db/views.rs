use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;

use crate::application::filter::{KeyFilter, ViewKey};
use crate::application::repos::{RepoError, ViewsRepo};
use crate::domain::entities::ViewRecord;
use crate::domain::error::DomainError;

use super::PostgresRepositories;
use super::filter::push_key_filter;
use super::util::map_sqlx_error;

const VIEW_COLUMNS: &str =
    "id, table_id, name, type, options, \"order\", created_time, last_modified_time";

#[derive(sqlx::FromRow)]
struct ViewRow {
    id: String,
    table_id: String,
    name: String,
    #[sqlx(rename = "type")]
    view_type: String,
    options: serde_json::Value,
    order: f64,
    created_time: OffsetDateTime,
    last_modified_time: Option<OffsetDateTime>,
}

impl TryFrom<ViewRow> for ViewRecord {
    type Error = DomainError;

    fn try_from(row: ViewRow) -> Result<Self, Self::Error> {
        Ok(Self {
            view_type: row.view_type.parse()?,
            id: row.id,
            table_id: row.table_id,
            name: row.name,
            options: row.options,
            order: row.order,
            created_time: row.created_time,
            last_modified_time: row.last_modified_time,
        })
    }
}

fn view_column(key: ViewKey) -> &'static str {
    match key {
        ViewKey::Id => "id",
        ViewKey::Name => "name",
        ViewKey::Type => "type",
    }
}

fn into_records(rows: Vec<ViewRow>) -> Result<Vec<ViewRecord>, RepoError> {
    rows.into_iter()
        .map(ViewRecord::try_from)
        .collect::<Result<_, _>>()
        .map_err(RepoError::from)
}

#[async_trait]
impl ViewsRepo for PostgresRepositories {
    async fn find_views_by_table_id(
        &self,
        table_id: &str,
        filter: Option<&KeyFilter<ViewKey>>,
    ) -> Result<Vec<ViewRecord>, RepoError> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {VIEW_COLUMNS} FROM view WHERE deleted_time IS NULL AND table_id = "
        ));
        qb.push_bind(table_id.to_string());
        push_key_filter(&mut qb, filter, view_column);
        qb.push(" ORDER BY \"order\" ASC");

        let rows = qb
            .build_query_as::<ViewRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        into_records(rows)
    }

    async fn find_views_by_ids(&self, ids: &[String]) -> Result<Vec<ViewRecord>, RepoError> {
        let sql =
            format!("SELECT {VIEW_COLUMNS} FROM view WHERE deleted_time IS NULL AND id = ANY($1)");
        let rows = sqlx::query_as::<_, ViewRow>(&sql)
            .bind(ids)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        into_records(rows)
    }
}
