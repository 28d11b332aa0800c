//! Repository traits describing persistence adapters.
//!
//! Every read excludes soft-deleted rows.

use async_trait::async_trait;
use thiserror::Error;

use crate::application::filter::{FieldKey, KeyFilter, TableKey, ViewKey};
use crate::domain::entities::{FieldRecord, TableRecord, ViewRecord};
use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait TablesRepo: Send + Sync {
    /// Tables of a base ordered by `order`, with `filter` applied as a store predicate.
    async fn find_tables_by_base_id(
        &self,
        base_id: &str,
        filter: Option<&KeyFilter<TableKey>>,
    ) -> Result<Vec<TableRecord>, RepoError>;

    async fn find_tables_by_ids(&self, ids: &[String]) -> Result<Vec<TableRecord>, RepoError>;
}

#[async_trait]
pub trait TablesWriteRepo: Send + Sync {
    /// Soft-delete a table together with its fields and views.
    async fn soft_delete_table(&self, table_id: &str) -> Result<(), RepoError>;
}

#[async_trait]
pub trait FieldsRepo: Send + Sync {
    async fn find_fields_by_table_id(
        &self,
        table_id: &str,
        filter: Option<&KeyFilter<FieldKey>>,
    ) -> Result<Vec<FieldRecord>, RepoError>;

    async fn find_fields_by_ids(&self, ids: &[String]) -> Result<Vec<FieldRecord>, RepoError>;
}

#[async_trait]
pub trait ViewsRepo: Send + Sync {
    async fn find_views_by_table_id(
        &self,
        table_id: &str,
        filter: Option<&KeyFilter<ViewKey>>,
    ) -> Result<Vec<ViewRecord>, RepoError>;

    async fn find_views_by_ids(&self, ids: &[String]) -> Result<Vec<ViewRecord>, RepoError>;
}
