//! PostgreSQL implementation of the registry store.

use async_trait::async_trait;
use fixity_core::{
    DeleteOutcome, Fingerprint, FingerprintRecord, InsertOutcome, NewRecord, Page, PageRequest,
    RegistryError, RegistryStore, Result,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::error::{is_unique_violation, query_error};
use super::{rows_into_page, PoolSettings, RecordRow, StoreError};

/// PostgreSQL-backed registry store.
///
/// Uniqueness of `file_hash` is enforced by the table itself, so concurrent
/// ingests of the same content race on the constraint rather than in Rust.
#[derive(Clone)]
pub struct PostgresRegistryStore {
    pool: PgPool,
}

impl PostgresRegistryStore {
    /// Connect to `database_url` and apply pending migrations.
    pub async fn new(
        database_url: &str,
        settings: PoolSettings,
    ) -> std::result::Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        sqlx::migrate!("./migrations/postgres")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        tracing::info!(
            max_connections = settings.max_connections,
            "Registry store connected (postgres), migrations applied"
        );

        Ok(Self { pool })
    }

    /// Create a store from an existing pool (for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_snapshot(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COALESCE(MAX(sequence), 0) FROM fingerprints")
            .fetch_one(&self.pool)
            .await
            .map_err(query_error)
    }
}

#[async_trait]
impl RegistryStore for PostgresRegistryStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn exists(&self, hash: &Fingerprint) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM fingerprints WHERE file_hash = $1)")
            .bind(hash.to_hex())
            .fetch_one(&self.pool)
            .await
            .map_err(query_error)
    }

    async fn get(&self, hash: &Fingerprint) -> Result<Option<FingerprintRecord>> {
        let row: Option<RecordRow> = sqlx::query_as(
            r#"
            SELECT sequence, file_hash, filename, hostname, upload_time
            FROM fingerprints
            WHERE file_hash = $1
            "#,
        )
        .bind(hash.to_hex())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(row.map(FingerprintRecord::try_from).transpose()?)
    }

    async fn insert(&self, record: NewRecord) -> Result<FingerprintRecord> {
        let inserted: std::result::Result<i64, sqlx::Error> = sqlx::query_scalar(
            r#"
            INSERT INTO fingerprints (file_hash, filename, hostname, upload_time)
            VALUES ($1, $2, $3, $4)
            RETURNING sequence
            "#,
        )
        .bind(record.file_hash.to_hex())
        .bind(&record.filename)
        .bind(&record.hostname)
        .bind(record.upload_time)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(sequence) => Ok(record.into_record(sequence)),
            Err(e) if is_unique_violation(&e) => Err(RegistryError::Conflict(record.file_hash)),
            Err(e) => Err(query_error(e)),
        }
    }

    async fn insert_if_absent(&self, record: NewRecord) -> Result<InsertOutcome> {
        let sequence: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO fingerprints (file_hash, filename, hostname, upload_time)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (file_hash) DO NOTHING
            RETURNING sequence
            "#,
        )
        .bind(record.file_hash.to_hex())
        .bind(&record.filename)
        .bind(&record.hostname)
        .bind(record.upload_time)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(match sequence {
            Some(sequence) => InsertOutcome::Inserted(record.into_record(sequence)),
            None => InsertOutcome::AlreadyPresent,
        })
    }

    /// `BIGSERIAL` values are handed out before commit, so a row committed
    /// after the snapshot was taken can still carry a sequence below it and
    /// appear on a later page of the same session.
    async fn get_page(&self, request: &PageRequest) -> Result<Page> {
        let snapshot = match request.snapshot() {
            Some(bound) => bound,
            None => self.current_snapshot().await?,
        };

        let rows: Vec<RecordRow> = sqlx::query_as(
            r#"
            SELECT sequence, file_hash, filename, hostname, upload_time
            FROM fingerprints
            WHERE sequence <= $1
            ORDER BY upload_time DESC, sequence DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(snapshot)
        .bind(i64::from(request.limit()) + 1)
        .bind(i64::try_from(request.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(rows_into_page(rows, request.limit(), snapshot)?)
    }

    async fn delete(&self, hash: &Fingerprint) -> Result<DeleteOutcome> {
        let result = sqlx::query("DELETE FROM fingerprints WHERE file_hash = $1")
            .bind(hash.to_hex())
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        Ok(if result.rows_affected() > 0 {
            DeleteOutcome::Removed
        } else {
            DeleteOutcome::NotFound
        })
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM fingerprints")
            .fetch_one(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(count.max(0) as u64)
    }

    async fn check_health(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
