//! Error types for the SQL registry stores.

use fixity_core::RegistryError;
use thiserror::Error;

/// Errors that can occur when talking to a SQL backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection failed
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Migration execution failed
    #[error("Migration error: {0}")]
    Migration(String),

    /// SQL query execution failed
    #[error("Query error: {0}")]
    Query(String),

    /// A stored row could not be decoded
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// The database URL names no supported backend
    #[error("Unsupported database URL scheme: {0}")]
    UnsupportedScheme(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Query(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        Self::Migration(e.to_string())
    }
}

impl From<StoreError> for RegistryError {
    fn from(e: StoreError) -> Self {
        RegistryError::storage(e.to_string())
    }
}

/// Map a query failure to the registry taxonomy.
pub(crate) fn query_error(e: sqlx::Error) -> RegistryError {
    StoreError::from(e).into()
}

/// Whether a query failed on the `file_hash` uniqueness constraint.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_becomes_storage_error() {
        let err: RegistryError = StoreError::Connection("refused".into()).into();
        assert!(matches!(err, RegistryError::Storage(ref msg) if msg.contains("refused")));
        assert!(!err.is_per_file());
    }

    #[test]
    fn test_pool_closed_is_not_unique_violation() {
        assert!(!is_unique_violation(&sqlx::Error::PoolClosed));
    }
}
