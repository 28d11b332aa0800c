use thiserror::Error;

use crate::{
    application::{repos::RepoError, schema::SchemaError},
    domain::error::DomainError,
    infra::error::InfraError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("resource not found")]
    NotFound,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

impl From<SchemaError> for AppError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::EmptyTableId => Self::validation(err.to_string()),
            SchemaError::Repo(RepoError::NotFound) => Self::NotFound,
            SchemaError::Repo(repo) => Self::Repo(repo),
        }
    }
}
