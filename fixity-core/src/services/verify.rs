//! Verification: does a candidate file match a registered fingerprint?
//!
//! Verification never writes to the store, whatever the outcome.

use std::sync::Arc;

use futures::future::join_all;
use futures::Stream;
use tracing::{debug, warn};

use super::{per_file_error, Upload, MAX_BATCH_FILES};
use crate::error::Result;
use crate::fingerprint::{fingerprint_stream_limited, Fingerprint};
use crate::store::RegistryStore;

/// Per-file result of a verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// `db_filename` is the name stored on the matching record, which may
    /// differ from the candidate's own name.
    Checked {
        filename: String,
        file_hash: Fingerprint,
        found: bool,
        db_filename: Option<String>,
    },
    Failed {
        filename: String,
        error: String,
    },
}

impl VerifyOutcome {
    pub fn filename(&self) -> &str {
        match self {
            Self::Checked { filename, .. } | Self::Failed { filename, .. } => filename,
        }
    }

    /// `Some(found)` for a checked file, `None` for a failed one.
    pub fn found(&self) -> Option<bool> {
        match self {
            Self::Checked { found, .. } => Some(*found),
            Self::Failed { .. } => None,
        }
    }

    pub fn db_filename(&self) -> Option<&str> {
        match self {
            Self::Checked { db_filename, .. } => db_filename.as_deref(),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result of comparing a file against a caller-supplied fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedHashCheck {
    pub filename: String,
    /// Fingerprint computed from the uploaded bytes
    pub file_hash: Fingerprint,
    /// The computed fingerprint equals the expected one
    pub matches: bool,
    /// The computed fingerprint is registered
    pub found: bool,
}

#[derive(Clone)]
pub struct VerificationService {
    store: Arc<dyn RegistryStore>,
    max_file_bytes: Option<u64>,
}

impl VerificationService {
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self {
            store,
            max_file_bytes: None,
        }
    }

    pub fn with_max_file_bytes(mut self, max_bytes: u64) -> Self {
        self.max_file_bytes = Some(max_bytes);
        self
    }

    /// Verify a single candidate file.
    pub async fn verify<S, B, E>(&self, upload: Upload<S>) -> Result<VerifyOutcome>
    where
        S: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let Upload { filename, content } = upload;

        let file_hash = match fingerprint_stream_limited(content, self.max_file_bytes).await {
            Ok(hash) => hash,
            Err(err) => {
                let error = per_file_error(err)?;
                warn!(filename = %filename, error = %error, "Failed to fingerprint candidate");
                return Ok(VerifyOutcome::Failed { filename, error });
            }
        };

        let db_filename = self.store.get(&file_hash).await?.map(|record| record.filename);
        debug!(
            file_hash = %file_hash,
            filename = %filename,
            found = db_filename.is_some(),
            "Candidate verified"
        );

        Ok(VerifyOutcome::Checked {
            filename,
            file_hash,
            found: db_filename.is_some(),
            db_filename,
        })
    }

    /// Verify a batch, returning one outcome per file in input order.
    pub async fn submit_for_verification<S, B, E>(
        &self,
        uploads: Vec<Upload<S>>,
    ) -> Result<Vec<VerifyOutcome>>
    where
        S: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        if uploads.len() > MAX_BATCH_FILES {
            debug!(
                received = uploads.len(),
                dropped = uploads.len() - MAX_BATCH_FILES,
                "Verification batch truncated"
            );
        }

        let pending = uploads
            .into_iter()
            .take(MAX_BATCH_FILES)
            .map(|upload| self.verify(upload));

        join_all(pending).await.into_iter().collect()
    }

    /// Compare a file against an expected fingerprint and look it up.
    ///
    /// A malformed `expected` value is a validation error.
    pub async fn check_expected<S, B, E>(
        &self,
        upload: Upload<S>,
        expected: &str,
    ) -> Result<ExpectedHashCheck>
    where
        S: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let expected: Fingerprint = expected.trim().parse()?;
        let Upload { filename, content } = upload;

        let file_hash = fingerprint_stream_limited(content, self.max_file_bytes).await?;
        let found = self.store.exists(&file_hash).await?;

        Ok(ExpectedHashCheck {
            filename,
            file_hash,
            matches: file_hash == expected,
            found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use crate::fingerprint::fingerprint_bytes;
    use crate::record::NewRecord;
    use crate::store::MemoryStore;

    async fn seeded() -> (Arc<MemoryStore>, VerificationService) {
        let store = Arc::new(MemoryStore::new());
        store
            .insert(NewRecord::now(fingerprint_bytes(b"hello"), "A", "ws-01"))
            .await
            .unwrap();
        (store.clone(), VerificationService::new(store))
    }

    #[tokio::test]
    async fn test_match_reports_stored_filename() {
        let (_, verification) = seeded().await;

        let outcome = verification
            .verify(Upload::from_bytes("C", "hello"))
            .await
            .unwrap();

        assert_eq!(outcome.filename(), "C");
        assert_eq!(outcome.found(), Some(true));
        assert_eq!(outcome.db_filename(), Some("A"));
    }

    #[tokio::test]
    async fn test_miss() {
        let (_, verification) = seeded().await;

        let outcome = verification
            .verify(Upload::from_bytes("C", "hello!"))
            .await
            .unwrap();

        assert_eq!(outcome.found(), Some(false));
        assert_eq!(outcome.db_filename(), None);
    }

    #[tokio::test]
    async fn test_verification_is_read_only() {
        let (store, verification) = seeded().await;

        verification
            .submit_for_verification(vec![
                Upload::from_bytes("x", "never ingested"),
                Upload::from_bytes("y", "hello"),
            ])
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_check_expected() {
        let (_, verification) = seeded().await;
        let expected = fingerprint_bytes(b"hello").to_hex().to_uppercase();

        let check = verification
            .check_expected(Upload::from_bytes("report.pdf", "hello"), &expected)
            .await
            .unwrap();
        assert!(check.matches);
        assert!(check.found);

        let check = verification
            .check_expected(Upload::from_bytes("report.pdf", "hellO"), &expected)
            .await
            .unwrap();
        assert!(!check.matches);
        assert!(!check.found);
    }

    #[tokio::test]
    async fn test_check_expected_rejects_malformed_hash() {
        let (_, verification) = seeded().await;

        let result = verification
            .check_expected(Upload::from_bytes("report.pdf", "hello"), "not-a-hash")
            .await;
        assert!(matches!(result, Err(RegistryError::Validation(_))));
    }
}
