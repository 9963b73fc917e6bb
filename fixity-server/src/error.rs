//! API error handling module
//!
//! Provides a unified error type for all API endpoints with structured error variants.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fixity_core::RegistryError;
use thiserror::Error;

/// API error type with structured variants for different error categories
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - client provided invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Registry error - error from the core library
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Registry(ref e) => match e {
                // Client-provided invalid input → 400
                RegistryError::Validation(_) | RegistryError::Io(_) => StatusCode::BAD_REQUEST,

                // Backend unreachable or failing → 503
                RegistryError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,

                // Never expected to escape the services → 500
                RegistryError::Conflict(_) | RegistryError::NotFound(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Get the error code for programmatic error handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "INVALID_INPUT",
            Self::Registry(ref e) => match e {
                RegistryError::Validation(_) => "INVALID_INPUT",
                RegistryError::Io(_) => "UNREADABLE_INPUT",
                RegistryError::Storage(_) => "STORAGE_UNAVAILABLE",
                RegistryError::Conflict(_) => "CONFLICT",
                RegistryError::NotFound(_) => "NOT_FOUND",
            },
        }
    }

    /// Get sanitized error message for client response
    fn client_message(&self) -> String {
        match self {
            Self::Registry(ref e) => match e {
                RegistryError::Validation(msg) => msg.clone(),
                RegistryError::Io(_) => "Uploaded content could not be read".to_string(),
                RegistryError::Storage(_) => "Registry storage unavailable".to_string(),
                RegistryError::Conflict(_) | RegistryError::NotFound(_) => {
                    "Unexpected registry state".to_string()
                }
            },
            Self::BadRequest(_) => self.to_string(),
        }
    }

    /// Get the error category for logging
    fn error_category(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Registry(_) => "registry",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let category = self.error_category();
        let code = self.error_code();
        let internal_message = self.to_string();
        let client_message = self.client_message();

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                category = category,
                code = code,
                error = %internal_message,
                "Server error"
            );
        } else {
            tracing::warn!(
                status = %status,
                category = category,
                code = code,
                error = %internal_message,
                "Client error"
            );
        }

        let body = serde_json::json!({
            "error": client_message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_mapping() {
        let cases = [
            (
                ApiError::from(RegistryError::validation("limit must be positive")),
                StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
            ),
            (
                ApiError::from(RegistryError::storage("pool closed")),
                StatusCode::SERVICE_UNAVAILABLE,
                "STORAGE_UNAVAILABLE",
            ),
            (
                ApiError::from(RegistryError::Io(std::io::Error::other("reset"))),
                StatusCode::BAD_REQUEST,
                "UNREADABLE_INPUT",
            ),
            (
                ApiError::from(RegistryError::NotFound(fixity_core::fingerprint_bytes(b"x"))),
                StatusCode::INTERNAL_SERVER_ERROR,
                "NOT_FOUND",
            ),
        ];

        for (err, status, code) in cases {
            assert_eq!(err.status_code(), status);
            assert_eq!(err.error_code(), code);
        }
    }

    #[test]
    fn test_storage_details_are_not_leaked() {
        let err = ApiError::from(RegistryError::storage("password=hunter2"));
        assert!(!err.client_message().contains("hunter2"));
        assert!(err.to_string().contains("hunter2"));
    }

    #[test]
    fn test_bad_request_mapping() {
        let err = ApiError::bad_request("Expected multipart/form-data");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert_eq!(err.error_category(), "bad_request");
        assert_eq!(
            err.client_message(),
            "Bad request: Expected multipart/form-data"
        );
    }

    #[test]
    fn test_validation_message_is_passed_through() {
        let err = ApiError::from(RegistryError::validation("offset must be non-negative, got -1"));
        assert_eq!(err.client_message(), "offset must be non-negative, got -1");
    }
}
