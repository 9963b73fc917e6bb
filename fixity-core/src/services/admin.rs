//! Administration: listing and deleting records.

use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::fingerprint::Fingerprint;
use crate::record::{DeleteOutcome, Page, PageRequest};
use crate::store::RegistryStore;

#[derive(Clone)]
pub struct AdminService {
    store: Arc<dyn RegistryStore>,
}

impl AdminService {
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self { store }
    }

    /// One page of records, newest first.
    pub async fn list_records(&self, request: &PageRequest) -> Result<Page> {
        self.store.get_page(request).await
    }

    /// Remove a record. Deleting an absent fingerprint is a no-op.
    pub async fn delete_record(&self, hash: &Fingerprint) -> Result<DeleteOutcome> {
        let outcome = self.store.delete(hash).await?;
        info!(file_hash = %hash, removed = outcome.removed(), "Delete requested");
        Ok(outcome)
    }

    /// Remove a record and re-serve the caller's current page.
    pub async fn delete_and_refresh(
        &self,
        hash: &Fingerprint,
        request: &PageRequest,
    ) -> Result<(DeleteOutcome, Page)> {
        let outcome = self.delete_record(hash).await?;
        let page = self.list_records(request).await?;
        Ok((outcome, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint_bytes;
    use crate::record::NewRecord;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_delete_and_refresh() {
        let store = Arc::new(MemoryStore::new());
        for name in ["a", "b", "c"] {
            store
                .insert(NewRecord::now(fingerprint_bytes(name.as_bytes()), name, "ws-01"))
                .await
                .unwrap();
        }
        let admin = AdminService::new(store);
        let request = PageRequest::new(2, 0).unwrap();

        let (outcome, page) = admin
            .delete_and_refresh(&fingerprint_bytes(b"c"), &request)
            .await
            .unwrap();

        assert!(outcome.removed());
        let names: Vec<_> = page.records.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert!(!page.has_more);

        let (outcome, _) = admin
            .delete_and_refresh(&fingerprint_bytes(b"c"), &request)
            .await
            .unwrap();
        assert!(!outcome.removed());
    }
}
