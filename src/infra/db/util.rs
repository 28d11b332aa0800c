use crate::application::repos::RepoError;

// Postgres SQLSTATE codes the repositories distinguish.
const FOREIGN_KEY_VIOLATION: &str = "23503";
const UNIQUE_VIOLATION: &str = "23505";
const INVALID_TEXT_REPRESENTATION: &str = "22P02";
const QUERY_CANCELED: &str = "57014";

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some(FOREIGN_KEY_VIOLATION | INVALID_TEXT_REPRESENTATION) => {
                RepoError::invalid_input(db.message())
            }
            Some(UNIQUE_VIOLATION) => RepoError::Integrity {
                message: format!(
                    "{} ({})",
                    db.message(),
                    db.constraint().unwrap_or("unknown constraint")
                ),
            },
            Some(QUERY_CANCELED) => RepoError::Timeout,
            _ => RepoError::from_persistence(db.message()),
        },
        other => RepoError::from_persistence(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rows_and_pool_timeouts_are_classified() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            RepoError::NotFound
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            RepoError::Timeout
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolClosed),
            RepoError::Persistence(_)
        ));
    }
}
