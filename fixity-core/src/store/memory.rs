//! In-memory registry store.
//!
//! Records are lost on restart. A single `RwLock` guards both indexes, so the
//! existence check and the insert happen under the same write guard.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::RegistryStore;
use crate::error::{RegistryError, Result};
use crate::fingerprint::Fingerprint;
use crate::record::{DeleteOutcome, FingerprintRecord, InsertOutcome, NewRecord, Page, PageRequest};

/// Listing order key: newest first, later insert first on equal timestamps.
type ListingKey = (Reverse<DateTime<Utc>>, Reverse<i64>);

#[derive(Default)]
struct Tables {
    by_hash: HashMap<Fingerprint, FingerprintRecord>,
    listing: BTreeMap<ListingKey, Fingerprint>,
    last_sequence: i64,
    closed: bool,
}

impl Tables {
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(RegistryError::storage("Registry store is closed"))
        } else {
            Ok(())
        }
    }

    fn insert_unchecked(&mut self, record: NewRecord) -> FingerprintRecord {
        self.last_sequence += 1;
        let stored = record.into_record(self.last_sequence);

        self.listing.insert(
            (Reverse(stored.upload_time), Reverse(stored.sequence)),
            stored.file_hash,
        );
        self.by_hash.insert(stored.file_hash, stored.clone());
        stored
    }
}

/// Process-local registry store.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegistryStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn exists(&self, hash: &Fingerprint) -> Result<bool> {
        let tables = self.tables.read().await;
        tables.ensure_open()?;
        Ok(tables.by_hash.contains_key(hash))
    }

    async fn get(&self, hash: &Fingerprint) -> Result<Option<FingerprintRecord>> {
        let tables = self.tables.read().await;
        tables.ensure_open()?;
        Ok(tables.by_hash.get(hash).cloned())
    }

    async fn insert(&self, record: NewRecord) -> Result<FingerprintRecord> {
        let mut tables = self.tables.write().await;
        tables.ensure_open()?;

        if tables.by_hash.contains_key(&record.file_hash) {
            return Err(RegistryError::Conflict(record.file_hash));
        }
        Ok(tables.insert_unchecked(record))
    }

    async fn insert_if_absent(&self, record: NewRecord) -> Result<InsertOutcome> {
        let mut tables = self.tables.write().await;
        tables.ensure_open()?;

        if tables.by_hash.contains_key(&record.file_hash) {
            return Ok(InsertOutcome::AlreadyPresent);
        }
        Ok(InsertOutcome::Inserted(tables.insert_unchecked(record)))
    }

    async fn get_page(&self, request: &PageRequest) -> Result<Page> {
        let tables = self.tables.read().await;
        tables.ensure_open()?;

        let snapshot = request.snapshot().unwrap_or(tables.last_sequence);
        let limit = request.limit() as usize;

        let mut window: Vec<FingerprintRecord> = tables
            .listing
            .values()
            .filter_map(|hash| tables.by_hash.get(hash))
            .filter(|record| record.sequence <= snapshot)
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(limit.saturating_add(1))
            .cloned()
            .collect();

        let has_more = window.len() > limit;
        window.truncate(limit);

        Ok(Page {
            records: window,
            has_more,
            snapshot,
        })
    }

    async fn delete(&self, hash: &Fingerprint) -> Result<DeleteOutcome> {
        let mut tables = self.tables.write().await;
        tables.ensure_open()?;

        match tables.by_hash.remove(hash) {
            Some(record) => {
                tables
                    .listing
                    .remove(&(Reverse(record.upload_time), Reverse(record.sequence)));
                Ok(DeleteOutcome::Removed)
            }
            None => Ok(DeleteOutcome::NotFound),
        }
    }

    async fn count(&self) -> Result<u64> {
        let tables = self.tables.read().await;
        tables.ensure_open()?;
        Ok(tables.by_hash.len() as u64)
    }

    async fn check_health(&self) -> Result<()> {
        self.tables.read().await.ensure_open()
    }

    async fn close(&self) {
        let mut tables = self.tables.write().await;
        tables.closed = true;
        tracing::info!(records = tables.by_hash.len(), "Memory registry store closed");
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint_bytes;
    use chrono::Duration;

    fn record(content: &[u8], name: &str) -> NewRecord {
        NewRecord::now(fingerprint_bytes(content), name, "ws-01")
    }

    #[tokio::test]
    async fn test_insert_then_conflict() {
        let store = MemoryStore::new();
        let stored = store.insert(record(b"hello", "A")).await.unwrap();
        assert_eq!(stored.sequence, 1);
        assert!(store.exists(&stored.file_hash).await.unwrap());

        let err = store.insert(record(b"hello", "B")).await.unwrap_err();
        assert!(matches!(err, RegistryError::Conflict(h) if h == stored.file_hash));

        let kept = store.get(&stored.file_hash).await.unwrap().unwrap();
        assert_eq!(kept.filename, "A");
    }

    #[tokio::test]
    async fn test_insert_if_absent() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.insert_if_absent(record(b"x", "x1")).await.unwrap(),
            InsertOutcome::Inserted(_)
        ));
        assert_eq!(
            store.insert_if_absent(record(b"x", "x2")).await.unwrap(),
            InsertOutcome::AlreadyPresent
        );
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_listing_order_breaks_ties_by_sequence() {
        let store = MemoryStore::new();
        let base = Utc::now();

        let mut older = record(b"older", "older");
        older.upload_time = base - Duration::seconds(10);
        let mut first = record(b"first", "first");
        first.upload_time = base;
        let mut second = record(b"second", "second");
        second.upload_time = base;

        store.insert(first).await.unwrap();
        store.insert(older).await.unwrap();
        store.insert(second).await.unwrap();

        let page = store
            .get_page(&PageRequest::new(10, 0).unwrap())
            .await
            .unwrap();
        let names: Vec<_> = page.records.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, ["second", "first", "older"]);
        assert!(!page.has_more);
        assert_eq!(page.snapshot, 3);
    }

    #[tokio::test]
    async fn test_page_window_and_has_more() {
        let store = MemoryStore::new();
        for i in 0..5u8 {
            store.insert(record(&[i], &format!("f{i}"))).await.unwrap();
        }

        let page = store
            .get_page(&PageRequest::new(2, 0).unwrap())
            .await
            .unwrap();
        assert_eq!(page.records.len(), 2);
        assert!(page.has_more);

        let last = store
            .get_page(&PageRequest::new(2, 4).unwrap())
            .await
            .unwrap();
        assert_eq!(last.records.len(), 1);
        assert!(!last.has_more);

        let beyond = store
            .get_page(&PageRequest::new(2, 50).unwrap())
            .await
            .unwrap();
        assert!(beyond.records.is_empty());
        assert!(!beyond.has_more);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        let stored = store.insert(record(b"gone", "gone.txt")).await.unwrap();

        assert_eq!(
            store.delete(&stored.file_hash).await.unwrap(),
            DeleteOutcome::Removed
        );
        assert_eq!(
            store.delete(&stored.file_hash).await.unwrap(),
            DeleteOutcome::NotFound
        );
        let page = store
            .get_page(&PageRequest::new(10, 0).unwrap())
            .await
            .unwrap();
        assert!(page.records.is_empty());
    }

    #[tokio::test]
    async fn test_closed_store_rejects_operations() {
        let store = MemoryStore::new();
        store.close().await;

        assert!(matches!(
            store.exists(&fingerprint_bytes(b"a")).await,
            Err(RegistryError::Storage(_))
        ));
        assert!(store.check_health().await.is_err());
    }
}
