//! SQL-backed registry stores.
//!
//! Two `sqlx` backends implement [`fixity_core::RegistryStore`]:
//! - [`PostgresRegistryStore`] for shared deployments
//! - [`SqliteRegistryStore`] for single-node deployments and tests
//!
//! [`open_store`] picks one from the database URL and falls back to the
//! in-memory store when no URL is configured.

pub mod error;
pub mod postgres;
pub mod sqlite;

pub use error::StoreError;
pub use postgres::PostgresRegistryStore;
pub use sqlite::SqliteRegistryStore;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use fixity_core::{FingerprintRecord, MemoryStore, RegistryStore};
use sqlx::FromRow;

use crate::config::Config;

/// Connection pool sizing shared by both backends.
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 20,
            min_connections: 2,
        }
    }
}

impl From<&Config> for PoolSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_connections: config.database_max_connections,
            min_connections: config.database_min_connections.min(config.database_max_connections),
        }
    }
}

/// Open the store named by `database_url`.
///
/// Accepts `postgres://`, `postgresql://` and `sqlite:` URLs. An empty URL
/// selects the process-local memory store.
pub async fn open_store(
    database_url: &str,
    pool: PoolSettings,
) -> Result<Arc<dyn RegistryStore>, StoreError> {
    let url = database_url.trim();

    if url.is_empty() {
        tracing::warn!("DATABASE_URL not set, using in-memory registry (records are lost on exit)");
        return Ok(Arc::new(MemoryStore::new()));
    }

    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        let store = PostgresRegistryStore::new(url, pool).await?;
        return Ok(Arc::new(store));
    }

    if url.starts_with("sqlite:") {
        let store = SqliteRegistryStore::new(url, pool).await?;
        return Ok(Arc::new(store));
    }

    let scheme = url.split(':').next().unwrap_or_default().to_string();
    Err(StoreError::UnsupportedScheme(scheme))
}

/// Row shape shared by both SQL backends.
#[derive(FromRow)]
struct RecordRow {
    sequence: i64,
    file_hash: String,
    filename: String,
    hostname: String,
    upload_time: DateTime<Utc>,
}

impl TryFrom<RecordRow> for FingerprintRecord {
    type Error = StoreError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let file_hash = row
            .file_hash
            .parse()
            .map_err(|e| StoreError::CorruptRow(format!("file_hash {:?}: {}", row.file_hash, e)))?;

        Ok(Self {
            upload_time: row.upload_time,
            filename: row.filename,
            hostname: row.hostname,
            file_hash,
            sequence: row.sequence,
        })
    }
}

/// Decode fetched rows, dropping the look-ahead row used for `has_more`.
fn rows_into_page(
    mut rows: Vec<RecordRow>,
    limit: u32,
    snapshot: i64,
) -> Result<fixity_core::Page, StoreError> {
    let has_more = rows.len() > limit as usize;
    rows.truncate(limit as usize);

    let records = rows
        .into_iter()
        .map(FingerprintRecord::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(fixity_core::Page {
        records,
        has_more,
        snapshot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixity_core::fingerprint_bytes;

    fn row(sequence: i64, hash: String) -> RecordRow {
        RecordRow {
            sequence,
            file_hash: hash,
            filename: format!("doc-{sequence}"),
            hostname: "ws-01".into(),
            upload_time: Utc::now(),
        }
    }

    #[test]
    fn test_rows_into_page_trims_lookahead() {
        let rows = (1..=3)
            .map(|i| row(i, fingerprint_bytes(&[i as u8]).to_hex()))
            .collect();
        let page = rows_into_page(rows, 2, 3).unwrap();
        assert_eq!(page.records.len(), 2);
        assert!(page.has_more);
        assert_eq!(page.snapshot, 3);
    }

    #[test]
    fn test_corrupt_hash_is_rejected() {
        let err = FingerprintRecord::try_from(row(1, "not-a-hash".into())).unwrap_err();
        assert!(matches!(err, StoreError::CorruptRow(_)));
    }

    #[tokio::test]
    async fn test_open_store_empty_url_is_memory() {
        let store = open_store("  ", PoolSettings::default()).await.unwrap();
        assert_eq!(store.backend(), "memory");
    }

    #[tokio::test]
    async fn test_open_store_rejects_unknown_scheme() {
        let err = open_store("mysql://localhost/registry", PoolSettings::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::UnsupportedScheme(ref s) if s == "mysql"));
    }
}
