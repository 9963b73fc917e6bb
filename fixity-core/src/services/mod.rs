//! Registry services: ingest, verification and administration.
//!
//! Batch operations take up to [`MAX_BATCH_FILES`] uploads; anything past the
//! cap is dropped. Each file's outcome is independent: a file that cannot be
//! read becomes a `Failed` outcome for that file alone, while a storage failure
//! aborts the whole request.

mod admin;
mod ingest;
mod verify;

pub use admin::AdminService;
pub use ingest::{IngestOutcome, IngestService};
pub use verify::{ExpectedHashCheck, VerificationService, VerifyOutcome};

use std::io;
use std::sync::Arc;

use crate::error::{RegistryError, Result};
use crate::store::RegistryStore;

/// Maximum number of files processed per batch.
pub const MAX_BATCH_FILES: usize = 10;

/// Chunk stream over an in-memory buffer.
pub type ByteChunks = futures::stream::Iter<std::vec::IntoIter<io::Result<Vec<u8>>>>;

/// A named file whose content arrives as a stream of chunks.
#[derive(Debug)]
pub struct Upload<S> {
    pub filename: String,
    pub content: S,
}

impl<S> Upload<S> {
    pub fn new(filename: impl Into<String>, content: S) -> Self {
        Self {
            filename: filename.into(),
            content,
        }
    }
}

impl Upload<ByteChunks> {
    /// Wrap an in-memory buffer as a single-chunk upload.
    pub fn from_bytes(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self::new(filename, futures::stream::iter(vec![Ok(content.into())]))
    }
}

/// Turn an error into a per-file message, or propagate it if it is fatal.
fn per_file_error(err: RegistryError) -> Result<String> {
    if err.is_per_file() {
        Ok(err.to_string())
    } else {
        Err(err)
    }
}

/// The three registry services sharing one store.
///
/// Owns the store's lifecycle: call [`Registry::close`] on shutdown.
#[derive(Clone)]
pub struct Registry {
    store: Arc<dyn RegistryStore>,
    pub ingest: IngestService,
    pub verification: VerificationService,
    pub admin: AdminService,
}

impl Registry {
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self {
            ingest: IngestService::new(store.clone()),
            verification: VerificationService::new(store.clone()),
            admin: AdminService::new(store.clone()),
            store,
        }
    }

    /// Reject files larger than `max_bytes` during ingest and verification.
    pub fn with_max_file_bytes(mut self, max_bytes: u64) -> Self {
        self.ingest = self.ingest.with_max_file_bytes(max_bytes);
        self.verification = self.verification.with_max_file_bytes(max_bytes);
        self
    }

    pub fn store(&self) -> &Arc<dyn RegistryStore> {
        &self.store
    }

    pub async fn close(&self) {
        tracing::info!(backend = self.store.backend(), "Closing registry store");
        self.store.close().await;
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("backend", &self.store.backend())
            .finish()
    }
}
