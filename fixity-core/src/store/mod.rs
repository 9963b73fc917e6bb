//! Registry storage backends.
//!
//! All registry state lives behind [`RegistryStore`]. Services receive the
//! store as a constructor dependency; nothing in this crate keeps a global.
//!
//! ## Backends
//!
//! - [`MemoryStore`] - process-local, used for development and tests
//! - PostgreSQL and SQLite - provided by the server crate via `sqlx`
//!
//! Every backend enforces uniqueness of `file_hash` itself, so two concurrent
//! ingests of the same new content can never both insert.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::{RegistryError, Result};
use crate::fingerprint::Fingerprint;
use crate::record::{DeleteOutcome, FingerprintRecord, InsertOutcome, NewRecord, Page, PageRequest};

/// Durable table of fingerprint records keyed by fingerprint.
///
/// Implementations must be thread-safe (`Send + Sync`). Listing order is
/// `upload_time` descending with `sequence` descending as the tie-breaker.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// Membership test.
    async fn exists(&self, hash: &Fingerprint) -> Result<bool>;

    /// Fetch a single record.
    async fn get(&self, hash: &Fingerprint) -> Result<Option<FingerprintRecord>>;

    /// Persist a new record.
    ///
    /// Fails with [`RegistryError::Conflict`] if the fingerprint is already
    /// present.
    async fn insert(&self, record: NewRecord) -> Result<FingerprintRecord>;

    /// Check-then-insert as one atomic operation.
    ///
    /// Backends with a native conditional insert should override this; the
    /// default relies on `insert` reporting the uniqueness violation.
    async fn insert_if_absent(&self, record: NewRecord) -> Result<InsertOutcome> {
        match self.insert(record).await {
            Ok(stored) => Ok(InsertOutcome::Inserted(stored)),
            Err(RegistryError::Conflict(_)) => Ok(InsertOutcome::AlreadyPresent),
            Err(e) => Err(e),
        }
    }

    /// Read one page in listing order.
    async fn get_page(&self, request: &PageRequest) -> Result<Page>;

    /// Remove a record; absent fingerprints report [`DeleteOutcome::NotFound`].
    async fn delete(&self, hash: &Fingerprint) -> Result<DeleteOutcome>;

    /// Total number of records.
    async fn count(&self) -> Result<u64>;

    /// Check backend connectivity.
    async fn check_health(&self) -> Result<()> {
        Ok(())
    }

    /// Release backend resources. Later calls fail with a storage error.
    async fn close(&self) {}
}
