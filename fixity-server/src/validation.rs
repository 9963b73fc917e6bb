//! Upload validation module
//!
//! Provides validation utilities for multipart uploads and path parameters.

use fixity_core::Fingerprint;

use crate::error::ApiError;

/// Name recorded for a file part that carries no usable filename
pub const FALLBACK_FILENAME: &str = "upload";

/// Validates the size of an uploaded file
///
/// Returns an error if the file exceeds the maximum size.
pub fn validate_file_size(size: u64, max_size: u64) -> Result<(), ApiError> {
    if size > max_size {
        let max_mb = max_size / (1024 * 1024);
        let actual_mb = size / (1024 * 1024);
        Err(ApiError::bad_request(format!(
            "File too large: {} MB exceeds maximum of {} MB",
            actual_mb, max_mb
        )))
    } else {
        Ok(())
    }
}

/// Parse a hex fingerprint supplied by the client.
///
/// Accepts either letter case; anything but 64 hex digits is a 400.
pub fn parse_fingerprint(raw: &str) -> Result<Fingerprint, ApiError> {
    raw.trim().parse::<Fingerprint>().map_err(ApiError::from)
}

/// Filename to record for an uploaded part.
pub fn upload_filename(file_name: Option<&str>) -> String {
    file_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_FILENAME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_validate_file_size_ok() {
        let max = 10 * 1024 * 1024; // 10 MB
        assert!(validate_file_size(1024, max).is_ok());
        assert!(validate_file_size(max, max).is_ok()); // exactly max
    }

    #[test]
    fn test_validate_file_size_too_large() {
        let max = 10 * 1024 * 1024;
        assert!(validate_file_size(max + 1, max).is_err());
        assert!(validate_file_size(20 * 1024 * 1024, max).is_err());
    }

    #[test]
    fn test_parse_fingerprint() {
        let hex = fixity_core::fingerprint_bytes(b"hello").to_hex();
        assert!(parse_fingerprint(&hex).is_ok());
        assert!(parse_fingerprint(&hex.to_uppercase()).is_ok());

        let err = parse_fingerprint("abc123").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_upload_filename() {
        assert_eq!(upload_filename(Some("report.pdf")), "report.pdf");
        assert_eq!(upload_filename(Some("  ")), FALLBACK_FILENAME);
        assert_eq!(upload_filename(None), FALLBACK_FILENAME);
    }
}
