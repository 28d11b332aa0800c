//! Schema mutations that must keep the unit-of-work cache coherent.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::repos::{RepoError, TablesWriteRepo};
use crate::cache::Loaders;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("table id must not be empty")]
    EmptyTableId,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct SchemaService {
    writer: Arc<dyn TablesWriteRepo>,
    loaders: Arc<Loaders>,
}

impl SchemaService {
    pub fn new(writer: Arc<dyn TablesWriteRepo>, loaders: Arc<Loaders>) -> Self {
        Self { writer, loaders }
    }

    pub fn loaders(&self) -> &Loaders {
        &self.loaders
    }

    /// Soft-delete a table, then drop whatever the current unit of work cached for it.
    ///
    /// Fields are purged by table id. Table and view slots have no per-parent
    /// invalidation, so they are cleared wholesale.
    pub async fn delete_table(&self, table_id: &str) -> Result<(), SchemaError> {
        if table_id.is_empty() {
            return Err(SchemaError::EmptyTableId);
        }

        self.writer.soft_delete_table(table_id).await?;

        self.loaders.fields.invalidate_table(table_id);
        self.loaders.tables.clear();
        self.loaders.views.clear();

        info!(table_id, "table deleted");
        Ok(())
    }
}
