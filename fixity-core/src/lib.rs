//! Fixity Core - file-integrity registry
//!
//! This crate fixes the cryptographic fingerprint of a file at a point in
//! time and checks candidate files against the recorded fingerprints later.
//!
//! # Features
//!
//! - Streaming SHA-256 fingerprints, never buffering whole files
//! - Pluggable [`RegistryStore`] with an atomic check-then-insert
//! - Snapshot-stable pagination, newest records first
//! - Per-file outcomes: one unreadable file never fails its batch
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use fixity_core::{MemoryStore, Registry, Upload};
//!
//! # async fn example() -> fixity_core::Result<()> {
//! let registry = Registry::new(Arc::new(MemoryStore::new()));
//!
//! let ingested = registry
//!     .ingest
//!     .submit_for_fingerprinting("ws-01", vec![Upload::from_bytes("A", "hello")])
//!     .await?;
//! assert_eq!(ingested[0].exists(), Some(false));
//!
//! let verified = registry
//!     .verification
//!     .submit_for_verification(vec![Upload::from_bytes("C", "hello")])
//!     .await?;
//! assert_eq!(verified[0].db_filename(), Some("A"));
//!
//! registry.close().await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fingerprint;
pub mod record;
pub mod services;
pub mod store;

// Re-export main types for convenience
pub use error::{RegistryError, Result};
pub use fingerprint::{
    fingerprint_bytes, fingerprint_reader, fingerprint_stream, fingerprint_stream_limited,
    Fingerprint, Hasher, FINGERPRINT_BYTES, FINGERPRINT_HEX_LEN,
};
pub use record::{DeleteOutcome, FingerprintRecord, InsertOutcome, NewRecord, Page, PageRequest};
pub use services::{
    AdminService, ByteChunks, ExpectedHashCheck, IngestOutcome, IngestService, Registry, Upload,
    VerificationService, VerifyOutcome, MAX_BATCH_FILES,
};
pub use store::{MemoryStore, RegistryStore};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// The canonical walkthrough: ingest A, re-ingest as B, verify as C.
    #[tokio::test]
    async fn test_ingest_dedup_verify_workflow() {
        let registry = Registry::new(Arc::new(MemoryStore::new()));

        let first = registry
            .ingest
            .submit_for_fingerprinting("ws-01", vec![Upload::from_bytes("A", "hello")])
            .await
            .expect("ingest A");
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].filename(), "A");
        assert_eq!(first[0].exists(), Some(false));

        let second = registry
            .ingest
            .submit_for_fingerprinting("ws-02", vec![Upload::from_bytes("B", "hello")])
            .await
            .expect("ingest B");
        assert_eq!(second[0].filename(), "B");
        assert_eq!(second[0].exists(), Some(true));

        let verified = registry
            .verification
            .submit_for_verification(vec![Upload::from_bytes("C", "hello")])
            .await
            .expect("verify C");
        assert_eq!(verified[0].filename(), "C");
        assert_eq!(verified[0].found(), Some(true));
        assert_eq!(verified[0].db_filename(), Some("A"));

        assert_eq!(registry.store().count().await.unwrap(), 1);
    }
}
