//! Postgres-backed repository implementations.

mod fields;
mod filter;
mod tables;
mod util;
mod views;

pub use util::map_sqlx_error;

use std::sync::Arc;

use sqlx::{
    Postgres, Transaction,
    postgres::{PgPool, PgPoolOptions},
    query,
};
use tracing::info;

use crate::config::DatabaseSettings;

use super::error::InfraError;

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<Transaction<'_, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    /// Open a pool from `database` settings and apply pending migrations.
    pub async fn from_settings(database: &DatabaseSettings) -> Result<Self, InfraError> {
        let url = database
            .url
            .as_deref()
            .ok_or_else(|| InfraError::configuration("database.url is not set"))?;
        let pool = Self::connect(url, database.max_connections.get()).await?;
        Self::run_migrations(&pool).await?;
        info!(
            max_connections = database.max_connections.get(),
            "database pool ready"
        );
        Ok(Self::new(pool))
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(pool).await
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }
}
