//! Table, field, and view bindings of the generic loader.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::filter::{FieldKey, KeyFilter, TableKey, ViewKey};
use crate::application::repos::{FieldsRepo, RepoError, TablesRepo, ViewsRepo};
use crate::domain::entities::{FieldRecord, TableRecord, ViewRecord};
use crate::domain::types::ResourceKind;

use super::config::CacheConfig;
use super::context::{CacheContext, Slot};
use super::loader::{ResourceAdapter, ResourceLoader};

pub type TableLoader = ResourceLoader<TableAdapter>;
pub type FieldLoader = ResourceLoader<FieldAdapter>;
pub type ViewLoader = ResourceLoader<ViewAdapter>;

/// Tables, keyed by base id.
pub struct TableAdapter {
    repo: Arc<dyn TablesRepo>,
}

impl TableAdapter {
    pub fn new(repo: Arc<dyn TablesRepo>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ResourceAdapter for TableAdapter {
    type Item = TableRecord;

    const KIND: ResourceKind = ResourceKind::Table;

    fn slot(context: &CacheContext) -> &Slot<TableRecord> {
        context.tables()
    }

    async fn find_many_by_parent_id(
        &self,
        parent_id: &str,
        filter: Option<&KeyFilter<TableKey>>,
    ) -> Result<Vec<TableRecord>, RepoError> {
        self.repo.find_tables_by_base_id(parent_id, filter).await
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<TableRecord>, RepoError> {
        self.repo.find_tables_by_ids(ids).await
    }
}

/// Fields, keyed by table id.
pub struct FieldAdapter {
    repo: Arc<dyn FieldsRepo>,
}

impl FieldAdapter {
    pub fn new(repo: Arc<dyn FieldsRepo>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ResourceAdapter for FieldAdapter {
    type Item = FieldRecord;

    const KIND: ResourceKind = ResourceKind::Field;

    fn slot(context: &CacheContext) -> &Slot<FieldRecord> {
        context.fields()
    }

    async fn find_many_by_parent_id(
        &self,
        parent_id: &str,
        filter: Option<&KeyFilter<FieldKey>>,
    ) -> Result<Vec<FieldRecord>, RepoError> {
        self.repo.find_fields_by_table_id(parent_id, filter).await
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<FieldRecord>, RepoError> {
        self.repo.find_fields_by_ids(ids).await
    }
}

impl FieldLoader {
    /// Forget cached fields of deleted or rewritten tables.
    ///
    /// Safe to repeat; silently does nothing outside a unit of work, when
    /// fields are not cached, or for tables that were never loaded.
    pub fn invalidate_tables<I, S>(&self, table_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.invalidate_parents(table_ids);
    }

    pub fn invalidate_table(&self, table_id: &str) {
        self.invalidate_parents([table_id]);
    }
}

/// Views, keyed by table id.
pub struct ViewAdapter {
    repo: Arc<dyn ViewsRepo>,
}

impl ViewAdapter {
    pub fn new(repo: Arc<dyn ViewsRepo>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ResourceAdapter for ViewAdapter {
    type Item = ViewRecord;

    const KIND: ResourceKind = ResourceKind::View;

    fn slot(context: &CacheContext) -> &Slot<ViewRecord> {
        context.views()
    }

    async fn find_many_by_parent_id(
        &self,
        parent_id: &str,
        filter: Option<&KeyFilter<ViewKey>>,
    ) -> Result<Vec<ViewRecord>, RepoError> {
        self.repo.find_views_by_table_id(parent_id, filter).await
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<ViewRecord>, RepoError> {
        self.repo.find_views_by_ids(ids).await
    }
}

/// The three loaders over one repository set.
pub struct Loaders {
    pub tables: TableLoader,
    pub fields: FieldLoader,
    pub views: ViewLoader,
}

impl Loaders {
    pub fn new<R>(repos: Arc<R>, config: &CacheConfig) -> Self
    where
        R: TablesRepo + FieldsRepo + ViewsRepo + 'static,
    {
        let tables: Arc<dyn TablesRepo> = repos.clone();
        let fields: Arc<dyn FieldsRepo> = repos.clone();
        let views: Arc<dyn ViewsRepo> = repos;
        Self {
            tables: TableLoader::new(TableAdapter::new(tables)).with_diagnostics(config.diagnostics),
            fields: FieldLoader::new(FieldAdapter::new(fields)).with_diagnostics(config.diagnostics),
            views: ViewLoader::new(ViewAdapter::new(views)).with_diagnostics(config.diagnostics),
        }
    }
}
