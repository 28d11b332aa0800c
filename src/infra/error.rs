use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {message}")]
    Database { message: String },
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl InfraError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}

impl From<sqlx::Error> for InfraError {
    fn from(err: sqlx::Error) -> Self {
        Self::database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for InfraError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::database(format!("migration failed: {err}"))
    }
}

impl From<crate::config::LoadError> for InfraError {
    fn from(err: crate::config::LoadError) -> Self {
        Self::configuration(err.to_string())
    }
}
