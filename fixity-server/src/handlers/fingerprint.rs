//! Ingest handler
//!
//! Fingerprints uploaded files and records the ones the registry has not seen.

use axum::{
    extract::{Multipart, State},
    Json,
};
use fixity_core::{IngestOutcome, Upload};
use serde::Serialize;
use utoipa::ToSchema;

use crate::client::ClientHost;
use crate::error::ApiError;
use crate::multipart::BatchParts;
use crate::state::AppState;

/// Per-file ingest result
///
/// Carries `file_hash` and `exists` when the file was fingerprinted, or
/// `error` when it could not be read.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileHashResult {
    /// Filename as uploaded
    pub filename: String,
    /// Hex-encoded SHA-256 fingerprint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_hash: Option<String>,
    /// True when the fingerprint was already registered and nothing was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exists: Option<bool>,
    /// Why this file could not be processed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<IngestOutcome> for FileHashResult {
    fn from(outcome: IngestOutcome) -> Self {
        match outcome {
            IngestOutcome::Recorded {
                filename,
                file_hash,
                exists,
            } => Self {
                filename,
                file_hash: Some(file_hash.to_hex()),
                exists: Some(exists),
                error: None,
            },
            IngestOutcome::Failed { filename, error } => Self {
                filename,
                file_hash: None,
                exists: None,
                error: Some(error),
            },
        }
    }
}

/// Batch ingest response, one result per file in upload order
#[derive(Debug, Serialize, ToSchema)]
pub struct HashResponse {
    pub results: Vec<FileHashResult>,
}

/// POST /hash - Fingerprint and register files
///
/// Accepts multipart/form-data with one or more file parts (typically named
/// `files`). Only the first 10 files are processed. Each file is streamed
/// through the hasher as it arrives.
///
/// The recorded hostname comes from `X-Client-Hostname`, then
/// `X-Forwarded-For`, then the peer address.
#[utoipa::path(
    post,
    path = "/hash",
    tag = "Registry",
    request_body(content_type = "multipart/form-data", description = "Files to register"),
    params(
        ("X-Client-Hostname" = Option<String>, Header, description = "Hostname to record for new entries")
    ),
    responses(
        (status = 200, description = "Per-file results", body = HashResponse),
        (status = 400, description = "Malformed multipart body"),
        (status = 503, description = "Registry storage unavailable")
    )
)]
pub async fn hash_handler(
    State(state): State<AppState>,
    ClientHost(hostname): ClientHost,
    mut multipart: Multipart,
) -> Result<Json<HashResponse>, ApiError> {
    let mut parts = BatchParts::default();
    let mut results = Vec::new();

    while let Some(field) = parts.next_part(&mut multipart).await? {
        let Some(filename) = parts.accept(&field) else {
            continue;
        };

        let outcome = state
            .registry
            .ingest
            .ingest(&hostname, Upload::new(filename, field))
            .await?;
        results.push(outcome.into());
    }

    tracing::info!(
        hostname = %hostname,
        files = parts.accepted(),
        "Ingest request completed"
    );

    Ok(Json(HashResponse { results }))
}
