//! In-memory repository implementation.
//!
//! Mirrors the Postgres repositories' contract (soft-deleted rows are
//! invisible, parent queries are ordered by `order`) and counts every query
//! it serves so callers can observe how often the store is reached.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::application::filter::{FieldKey, KeyFilter, TableKey, ViewKey};
use crate::application::repos::{FieldsRepo, RepoError, TablesRepo, TablesWriteRepo, ViewsRepo};
use crate::cache::CachedResource;
use crate::domain::entities::{FieldRecord, TableRecord, ViewRecord};
use crate::domain::types::ResourceKind;

#[derive(Debug, Clone)]
struct Row<T> {
    item: T,
    deleted_time: Option<OffsetDateTime>,
}

#[derive(Debug, Default)]
struct QueryCounters {
    table_parent: AtomicUsize,
    field_parent: AtomicUsize,
    view_parent: AtomicUsize,
}

#[derive(Debug)]
pub struct InMemoryRepositories {
    tables: RwLock<Vec<Row<TableRecord>>>,
    fields: RwLock<Vec<Row<FieldRecord>>>,
    views: RwLock<Vec<Row<ViewRecord>>>,
    counters: QueryCounters,
    id_requests: Mutex<Vec<(ResourceKind, Vec<String>)>>,
}

impl Default for InMemoryRepositories {
    fn default() -> Self {
        Self {
            tables: RwLock::new(Vec::new()),
            fields: RwLock::new(Vec::new()),
            views: RwLock::new(Vec::new()),
            counters: QueryCounters::default(),
            id_requests: Mutex::new(Vec::new()),
        }
    }
}

impl InMemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a table, replacing any row with the same id.
    pub fn insert_table(&self, table: TableRecord) {
        upsert(&self.tables, table);
    }

    pub fn insert_field(&self, field: FieldRecord) {
        upsert(&self.fields, field);
    }

    pub fn insert_view(&self, view: ViewRecord) {
        upsert(&self.views, view);
    }

    /// Soft-delete a single field.
    pub fn delete_field(&self, id: &str) -> bool {
        let now = OffsetDateTime::now_utc();
        let mut rows = self.fields.write().unwrap_or_else(PoisonError::into_inner);
        mark_deleted(&mut rows, now, |field| field.id == id) > 0
    }

    pub fn table_parent_queries(&self) -> usize {
        self.counters.table_parent.load(Ordering::SeqCst)
    }

    pub fn field_parent_queries(&self) -> usize {
        self.counters.field_parent.load(Ordering::SeqCst)
    }

    pub fn view_parent_queries(&self) -> usize {
        self.counters.view_parent.load(Ordering::SeqCst)
    }

    /// Id lists passed to the `find_*_by_ids` queries of `kind`, oldest first.
    pub fn id_requests(&self, kind: ResourceKind) -> Vec<Vec<String>> {
        self.id_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(requested, _)| *requested == kind)
            .map(|(_, ids)| ids.clone())
            .collect()
    }

    fn record_ids(&self, kind: ResourceKind, ids: &[String]) {
        self.id_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((kind, ids.to_vec()));
    }
}

fn upsert<T: CachedResource>(rows: &RwLock<Vec<Row<T>>>, item: T) {
    let mut rows = rows.write().unwrap_or_else(PoisonError::into_inner);
    match rows.iter_mut().find(|row| row.item.id() == item.id()) {
        Some(row) => {
            row.item = item;
            row.deleted_time = None;
        }
        None => rows.push(Row {
            item,
            deleted_time: None,
        }),
    }
}

fn mark_deleted<T>(rows: &mut [Row<T>], now: OffsetDateTime, pred: impl Fn(&T) -> bool) -> usize {
    let mut affected = 0;
    for row in rows.iter_mut() {
        if row.deleted_time.is_none() && pred(&row.item) {
            row.deleted_time = Some(now);
            affected += 1;
        }
    }
    affected
}

fn by_parent<T: CachedResource>(
    rows: &RwLock<Vec<Row<T>>>,
    parent_id: &str,
    filter: Option<&KeyFilter<T::Key>>,
) -> Vec<T> {
    let rows = rows.read().unwrap_or_else(PoisonError::into_inner);
    let mut items: Vec<T> = rows
        .iter()
        .filter(|row| row.deleted_time.is_none() && row.item.parent_id() == parent_id)
        .filter(|row| filter.is_none_or(|filter| filter.matches(|key| row.item.key_value(key))))
        .map(|row| row.item.clone())
        .collect();
    items.sort_by(|a, b| a.order().total_cmp(&b.order()));
    items
}

fn by_ids<T: CachedResource>(rows: &RwLock<Vec<Row<T>>>, ids: &[String]) -> Vec<T> {
    let rows = rows.read().unwrap_or_else(PoisonError::into_inner);
    rows.iter()
        .filter(|row| row.deleted_time.is_none() && ids.iter().any(|id| id == row.item.id()))
        .map(|row| row.item.clone())
        .collect()
}

#[async_trait]
impl TablesRepo for InMemoryRepositories {
    async fn find_tables_by_base_id(
        &self,
        base_id: &str,
        filter: Option<&KeyFilter<TableKey>>,
    ) -> Result<Vec<TableRecord>, RepoError> {
        self.counters.table_parent.fetch_add(1, Ordering::SeqCst);
        Ok(by_parent(&self.tables, base_id, filter))
    }

    async fn find_tables_by_ids(&self, ids: &[String]) -> Result<Vec<TableRecord>, RepoError> {
        self.record_ids(ResourceKind::Table, ids);
        Ok(by_ids(&self.tables, ids))
    }
}

#[async_trait]
impl TablesWriteRepo for InMemoryRepositories {
    async fn soft_delete_table(&self, table_id: &str) -> Result<(), RepoError> {
        let now = OffsetDateTime::now_utc();
        {
            let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
            if mark_deleted(&mut tables, now, |table| table.id == table_id) == 0 {
                return Err(RepoError::NotFound);
            }
        }
        {
            let mut fields = self.fields.write().unwrap_or_else(PoisonError::into_inner);
            mark_deleted(&mut fields, now, |field| field.table_id == table_id);
        }
        let mut views = self.views.write().unwrap_or_else(PoisonError::into_inner);
        mark_deleted(&mut views, now, |view| view.table_id == table_id);
        Ok(())
    }
}

#[async_trait]
impl FieldsRepo for InMemoryRepositories {
    async fn find_fields_by_table_id(
        &self,
        table_id: &str,
        filter: Option<&KeyFilter<FieldKey>>,
    ) -> Result<Vec<FieldRecord>, RepoError> {
        self.counters.field_parent.fetch_add(1, Ordering::SeqCst);
        Ok(by_parent(&self.fields, table_id, filter))
    }

    async fn find_fields_by_ids(&self, ids: &[String]) -> Result<Vec<FieldRecord>, RepoError> {
        self.record_ids(ResourceKind::Field, ids);
        Ok(by_ids(&self.fields, ids))
    }
}

#[async_trait]
impl ViewsRepo for InMemoryRepositories {
    async fn find_views_by_table_id(
        &self,
        table_id: &str,
        filter: Option<&KeyFilter<ViewKey>>,
    ) -> Result<Vec<ViewRecord>, RepoError> {
        self.counters.view_parent.fetch_add(1, Ordering::SeqCst);
        Ok(by_parent(&self.views, table_id, filter))
    }

    async fn find_views_by_ids(&self, ids: &[String]) -> Result<Vec<ViewRecord>, RepoError> {
        self.record_ids(ResourceKind::View, ids);
        Ok(by_ids(&self.views, ids))
    }
}
