//! Verification handlers
//!
//! Check candidate files against the registry. Nothing here writes.

use axum::{
    extract::{Multipart, State},
    Json,
};
use fixity_core::{Upload, VerifyOutcome};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::multipart::{BatchParts, MultipartFields};
use crate::state::AppState;

/// Per-file verification result
#[derive(Debug, Serialize, ToSchema)]
pub struct FileVerifyResult {
    /// Filename of the candidate as uploaded
    pub filename: String,
    /// Hex-encoded SHA-256 fingerprint of the candidate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_hash: Option<String>,
    /// Whether the fingerprint is registered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found: Option<bool>,
    /// Filename stored on the matching record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_filename: Option<String>,
    /// Why this file could not be processed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<VerifyOutcome> for FileVerifyResult {
    fn from(outcome: VerifyOutcome) -> Self {
        match outcome {
            VerifyOutcome::Checked {
                filename,
                file_hash,
                found,
                db_filename,
            } => Self {
                filename,
                file_hash: Some(file_hash.to_hex()),
                found: Some(found),
                db_filename,
                error: None,
            },
            VerifyOutcome::Failed { filename, error } => Self {
                filename,
                file_hash: None,
                found: None,
                db_filename: None,
                error: Some(error),
            },
        }
    }
}

/// Batch verification response, one result per file in upload order
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyMultiResponse {
    pub results: Vec<FileVerifyResult>,
}

/// POST /verify-multi - Look up candidate files in the registry
///
/// Accepts multipart/form-data with one or more file parts. Only the first
/// 10 files are processed.
#[utoipa::path(
    post,
    path = "/verify-multi",
    tag = "Verification",
    request_body(content_type = "multipart/form-data", description = "Candidate files"),
    responses(
        (status = 200, description = "Per-file results", body = VerifyMultiResponse),
        (status = 400, description = "Malformed multipart body"),
        (status = 503, description = "Registry storage unavailable")
    )
)]
pub async fn verify_multi_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<VerifyMultiResponse>, ApiError> {
    let mut parts = BatchParts::default();
    let mut results = Vec::new();

    while let Some(field) = parts.next_part(&mut multipart).await? {
        let Some(filename) = parts.accept(&field) else {
            continue;
        };

        let outcome = state
            .registry
            .verification
            .verify(Upload::new(filename, field))
            .await?;
        results.push(outcome.into());
    }

    Ok(Json(VerifyMultiResponse { results }))
}

/// Response for a single-file check against an expected fingerprint
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    /// Filename as uploaded
    pub filename: String,
    /// Fingerprint computed from the uploaded bytes
    pub file_hash: String,
    /// Computed fingerprint equals the expected one
    pub matches: bool,
    /// Computed fingerprint is registered
    pub found: bool,
    /// Human-readable summary
    pub message: String,
}

/// POST /verify - Compare one file against an expected fingerprint
///
/// Accepts multipart/form-data with:
/// - `file`: The file to check (required)
/// - `hash`: Expected hex SHA-256 fingerprint, either letter case (required)
#[utoipa::path(
    post,
    path = "/verify",
    tag = "Verification",
    request_body(content_type = "multipart/form-data", description = "File and expected fingerprint"),
    responses(
        (status = 200, description = "Comparison result", body = VerifyResponse),
        (status = 400, description = "Missing field, malformed fingerprint or file too large"),
        (status = 503, description = "Registry storage unavailable")
    )
)]
pub async fn verify_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<VerifyResponse>, ApiError> {
    let mut fields = MultipartFields::parse(&mut multipart, state.max_file_bytes).await?;
    let expected = fields.require_text("hash")?.to_string();
    let file = fields.take_file()?;

    let check = state
        .registry
        .verification
        .check_expected(Upload::from_bytes(file.filename(), file.data), &expected)
        .await?;

    let message = format!(
        "{}. {}",
        if check.matches {
            "Fingerprint matches"
        } else {
            "Fingerprint does not match"
        },
        if check.found {
            "The file is registered."
        } else {
            "The file is not registered."
        }
    );

    Ok(Json(VerifyResponse {
        filename: check.filename,
        file_hash: check.file_hash.to_hex(),
        matches: check.matches,
        found: check.found,
        message,
    }))
}
