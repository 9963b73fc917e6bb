//! Registry administration handlers
//!
//! Paginated listing of records and record deletion.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use fixity_core::{FingerprintRecord, Page, PageRequest};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::parse_fingerprint;

/// Query parameters for listing records
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListUploadsQuery {
    /// Page size (defaults to the server's configured page size)
    #[param(default = 20, minimum = 1)]
    pub limit: Option<i64>,

    /// Number of records to skip
    #[param(default = 0, minimum = 0)]
    pub offset: Option<i64>,

    /// Snapshot returned by the first page of this paging session. Records
    /// registered after it are left out so later pages do not shift.
    #[param(minimum = 0)]
    pub as_of: Option<i64>,
}

impl ListUploadsQuery {
    fn page_request(&self, default_limit: i64) -> Result<PageRequest, ApiError> {
        let request = PageRequest::new(
            self.limit.unwrap_or(default_limit),
            self.offset.unwrap_or(0),
        )?
        .as_of(self.as_of)?;
        Ok(request)
    }
}

/// A registered fingerprint
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadRecord {
    /// When the record was created (RFC 3339, UTC)
    pub upload_time: DateTime<Utc>,
    /// Filename supplied at ingest
    pub filename: String,
    /// Host that performed the ingest
    pub hostname: String,
    /// Hex-encoded SHA-256 fingerprint
    pub file_hash: String,
}

impl From<FingerprintRecord> for UploadRecord {
    fn from(record: FingerprintRecord) -> Self {
        Self {
            upload_time: record.upload_time,
            filename: record.filename,
            hostname: record.hostname,
            file_hash: record.file_hash.to_hex(),
        }
    }
}

/// One page of records, newest first
#[derive(Debug, Serialize, ToSchema)]
pub struct ListUploadsResponse {
    pub uploads: Vec<UploadRecord>,
    /// More records exist past this page
    pub has_more: bool,
    /// Pass as `as_of` when requesting the following pages
    pub snapshot: i64,
}

impl From<Page> for ListUploadsResponse {
    fn from(page: Page) -> Self {
        Self {
            uploads: page.records.into_iter().map(Into::into).collect(),
            has_more: page.has_more,
            snapshot: page.snapshot,
        }
    }
}

/// Result of a delete plus the caller's refreshed page
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteUploadResponse {
    /// False when the fingerprint was not registered
    pub removed: bool,
    pub uploads: Vec<UploadRecord>,
    pub has_more: bool,
    pub snapshot: i64,
}

/// GET /uploads - List registered fingerprints
///
/// Ordered by registration time, newest first.
#[utoipa::path(
    get,
    path = "/uploads",
    tag = "Registry",
    params(ListUploadsQuery),
    responses(
        (status = 200, description = "One page of records", body = ListUploadsResponse),
        (status = 400, description = "Invalid pagination parameters"),
        (status = 503, description = "Registry storage unavailable")
    )
)]
pub async fn list_uploads_handler(
    State(state): State<AppState>,
    Query(query): Query<ListUploadsQuery>,
) -> Result<Json<ListUploadsResponse>, ApiError> {
    let request = query.page_request(state.default_page_limit)?;
    let page = state.registry.admin.list_records(&request).await?;
    Ok(Json(page.into()))
}

/// DELETE /uploads/{hash} - Remove a registered fingerprint
///
/// Deleting an unknown fingerprint succeeds with `removed: false`. The
/// response carries the page described by the optional pagination
/// parameters, read after the delete.
#[utoipa::path(
    delete,
    path = "/uploads/{hash}",
    tag = "Registry",
    params(
        ("hash" = String, Path, description = "Hex-encoded SHA-256 fingerprint"),
        ListUploadsQuery
    ),
    responses(
        (status = 200, description = "Delete outcome and refreshed page", body = DeleteUploadResponse),
        (status = 400, description = "Malformed fingerprint or pagination parameters"),
        (status = 503, description = "Registry storage unavailable")
    )
)]
pub async fn delete_upload_handler(
    State(state): State<AppState>,
    Path(hash): Path<String>,
    Query(query): Query<ListUploadsQuery>,
) -> Result<Json<DeleteUploadResponse>, ApiError> {
    let hash = parse_fingerprint(&hash)?;
    let request = query.page_request(state.default_page_limit)?;

    let (outcome, page) = state
        .registry
        .admin
        .delete_and_refresh(&hash, &request)
        .await?;
    let page = ListUploadsResponse::from(page);

    Ok(Json(DeleteUploadResponse {
        removed: outcome.removed(),
        uploads: page.uploads,
        has_more: page.has_more,
        snapshot: page.snapshot,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let request = ListUploadsQuery::default().page_request(20).unwrap();
        assert_eq!(request.limit(), 20);
        assert_eq!(request.offset(), 0);
        assert_eq!(request.snapshot(), None);
    }

    #[test]
    fn test_query_rejects_bad_values() {
        for query in [
            ListUploadsQuery {
                limit: Some(0),
                ..Default::default()
            },
            ListUploadsQuery {
                offset: Some(-1),
                ..Default::default()
            },
            ListUploadsQuery {
                as_of: Some(-3),
                ..Default::default()
            },
        ] {
            let err = query.page_request(20).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_INPUT");
        }
    }
}
