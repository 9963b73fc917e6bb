//! Ingest: fix a file's fingerprint into the registry.

use std::sync::Arc;

use futures::future::join_all;
use futures::Stream;
use tracing::{debug, info, warn};

use super::{per_file_error, Upload, MAX_BATCH_FILES};
use crate::error::Result;
use crate::fingerprint::{fingerprint_stream_limited, Fingerprint};
use crate::record::{InsertOutcome, NewRecord};
use crate::store::RegistryStore;

/// Per-file result of an ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// `exists` is true when the fingerprint was already registered and
    /// nothing was written.
    Recorded {
        filename: String,
        file_hash: Fingerprint,
        exists: bool,
    },
    Failed {
        filename: String,
        error: String,
    },
}

impl IngestOutcome {
    pub fn filename(&self) -> &str {
        match self {
            Self::Recorded { filename, .. } | Self::Failed { filename, .. } => filename,
        }
    }

    /// `Some(exists)` for a recorded file, `None` for a failed one.
    pub fn exists(&self) -> Option<bool> {
        match self {
            Self::Recorded { exists, .. } => Some(*exists),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Clone)]
pub struct IngestService {
    store: Arc<dyn RegistryStore>,
    max_file_bytes: Option<u64>,
}

impl IngestService {
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

    /// Ingest a single file on behalf of `hostname`.
    ///
    /// Read failures and oversized files produce [`IngestOutcome::Failed`];
    /// only storage failures are returned as `Err`.
    pub async fn ingest<S, B, E>(&self, hostname: &str, upload: Upload<S>) -> Result<IngestOutcome>
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
                warn!(filename = %filename, error = %error, "Failed to fingerprint file");
                return Ok(IngestOutcome::Failed { filename, error });
            }
        };

        let record = NewRecord::now(file_hash, filename.clone(), hostname);
        let exists = match self.store.insert_if_absent(record).await? {
            InsertOutcome::Inserted(stored) => {
                info!(
                    file_hash = %file_hash,
                    filename = %filename,
                    hostname = %stored.hostname,
                    "Fingerprint recorded"
                );
                false
            }
            InsertOutcome::AlreadyPresent => {
                debug!(file_hash = %file_hash, filename = %filename, "Fingerprint already registered");
                true
            }
        };

        Ok(IngestOutcome::Recorded {
            filename,
            file_hash,
            exists,
        })
    }

    /// Ingest a batch, returning one outcome per file in input order.
    pub async fn submit_for_fingerprinting<S, B, E>(
        &self,
        hostname: &str,
        uploads: Vec<Upload<S>>,
    ) -> Result<Vec<IngestOutcome>>
    where
        S: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        if uploads.len() > MAX_BATCH_FILES {
            debug!(
                received = uploads.len(),
                dropped = uploads.len() - MAX_BATCH_FILES,
                "Ingest batch truncated"
            );
        }

        let pending = uploads
            .into_iter()
            .take(MAX_BATCH_FILES)
            .map(|upload| self.ingest(hostname, upload));

        join_all(pending).await.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use crate::fingerprint::fingerprint_bytes;
    use crate::store::MemoryStore;
    use futures::stream;
    use std::io;

    fn service() -> (Arc<MemoryStore>, IngestService) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), IngestService::new(store))
    }

    #[tokio::test]
    async fn test_first_ingest_records_second_reports_exists() {
        let (store, ingest) = service();

        let first = ingest
            .ingest("ws-01", Upload::from_bytes("A", "hello"))
            .await
            .unwrap();
        let second = ingest
            .ingest("ws-02", Upload::from_bytes("B", "hello"))
            .await
            .unwrap();

        assert_eq!(first.exists(), Some(false));
        assert_eq!(second.exists(), Some(true));
        assert_eq!(store.count().await.unwrap(), 1);

        let stored = store.get(&fingerprint_bytes(b"hello")).await.unwrap().unwrap();
        assert_eq!(stored.filename, "A");
        assert_eq!(stored.hostname, "ws-01");
    }

    #[tokio::test]
    async fn test_batch_is_truncated_to_cap() {
        let (store, ingest) = service();
        let uploads: Vec<_> = (0..(MAX_BATCH_FILES + 3))
            .map(|i| Upload::from_bytes(format!("file-{i}"), vec![i as u8]))
            .collect();

        let outcomes = ingest
            .submit_for_fingerprinting("ws-01", uploads)
            .await
            .unwrap();

        assert_eq!(outcomes.len(), MAX_BATCH_FILES);
        assert_eq!(outcomes[0].filename(), "file-0");
        assert_eq!(outcomes[MAX_BATCH_FILES - 1].filename(), "file-9");
        assert_eq!(store.count().await.unwrap(), MAX_BATCH_FILES as u64);
    }

    #[tokio::test]
    async fn test_oversized_file_fails_alone() {
        let store = Arc::new(MemoryStore::new());
        let ingest = IngestService::new(store.clone()).with_max_file_bytes(4);

        let outcomes = ingest
            .submit_for_fingerprinting(
                "ws-01",
                vec![
                    Upload::from_bytes("small", "tiny"),
                    Upload::from_bytes("large", "far too large"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(outcomes[0].exists(), Some(false));
        assert!(outcomes[1].is_failed());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_aborts_request() {
        let (store, ingest) = service();
        store.close().await;

        let result = ingest
            .ingest("ws-01", Upload::from_bytes("A", "hello"))
            .await;
        assert!(matches!(result, Err(RegistryError::Storage(_))));
    }

    #[tokio::test]
    async fn test_read_error_reported_per_file() {
        let (_, ingest) = service();
        let broken: Vec<io::Result<Vec<u8>>> =
            vec![Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated upload"))];

        let outcome = ingest
            .ingest("ws-01", Upload::new("broken.bin", stream::iter(broken)))
            .await
            .unwrap();

        match outcome {
            IngestOutcome::Failed { filename, error } => {
                assert_eq!(filename, "broken.bin");
                assert!(error.contains("truncated upload"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
