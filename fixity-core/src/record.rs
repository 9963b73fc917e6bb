//! Registry data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::fingerprint::Fingerprint;

/// A stored fingerprint together with its ingest metadata.
///
/// Records are immutable: they are created once on first sight of a
/// fingerprint and only ever removed, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintRecord {
    /// When the record was inserted (UTC)
    pub upload_time: DateTime<Utc>,
    /// Filename supplied at ingest, display metadata only
    pub filename: String,
    /// Machine that performed the ingest
    pub hostname: String,
    /// Content fingerprint, the record's identity
    pub file_hash: Fingerprint,
    /// Store-assigned insertion number, strictly increasing
    #[serde(skip)]
    pub sequence: i64,
}

/// Input for creating a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub file_hash: Fingerprint,
    pub filename: String,
    pub hostname: String,
    pub upload_time: DateTime<Utc>,
}

impl NewRecord {
    /// Stamp a new record with the current time.
    pub fn now(
        file_hash: Fingerprint,
        filename: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            file_hash,
            filename: filename.into(),
            hostname: hostname.into(),
            upload_time: Utc::now(),
        }
    }

    /// Attach the sequence number a store assigned on insert.
    pub fn into_record(self, sequence: i64) -> FingerprintRecord {
        FingerprintRecord {
            upload_time: self.upload_time,
            filename: self.filename,
            hostname: self.hostname,
            file_hash: self.file_hash,
            sequence,
        }
    }
}

/// Validated pagination window.
///
/// `as_of` pins a paging session to the rows that existed when its first page
/// was read: rows with a higher sequence are invisible, so concurrent inserts
/// cannot shift later pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: u32,
    offset: u64,
    as_of: Option<i64>,
}

impl PageRequest {
    /// Validate raw pagination parameters.
    ///
    /// `limit` must be positive and `offset` non-negative.
    pub fn new(limit: i64, offset: i64) -> Result<Self> {
        if limit <= 0 {
            return Err(RegistryError::validation(format!(
                "limit must be a positive integer, got {}",
                limit
            )));
        }
        if offset < 0 {
            return Err(RegistryError::validation(format!(
                "offset must be non-negative, got {}",
                offset
            )));
        }
        let limit = u32::try_from(limit)
            .map_err(|_| RegistryError::validation(format!("limit {} is too large", limit)))?;

        Ok(Self {
            limit,
            offset: offset as u64,
            as_of: None,
        })
    }

    /// Restrict the window to rows visible at `as_of`.
    pub fn as_of(mut self, snapshot: Option<i64>) -> Result<Self> {
        if let Some(s) = snapshot {
            if s < 0 {
                return Err(RegistryError::validation(format!(
                    "as_of must be non-negative, got {}",
                    s
                )));
            }
        }
        self.as_of = snapshot;
        Ok(self)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn snapshot(&self) -> Option<i64> {
        self.as_of
    }

    /// Whether a record falls inside this request's snapshot.
    pub fn is_visible(&self, record: &FingerprintRecord) -> bool {
        self.as_of.map_or(true, |bound| record.sequence <= bound)
    }
}

/// One page of records in listing order (newest first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub records: Vec<FingerprintRecord>,
    /// At least one more visible record exists past this window
    pub has_more: bool,
    /// Snapshot bound to pass as `as_of` when fetching the following pages
    pub snapshot: i64,
}

/// Result of an atomic check-then-insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(FingerprintRecord),
    AlreadyPresent,
}

/// Result of a delete; deleting an absent fingerprint is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed,
    NotFound,
}

impl DeleteOutcome {
    pub fn removed(self) -> bool {
        matches!(self, Self::Removed)
    }
}
