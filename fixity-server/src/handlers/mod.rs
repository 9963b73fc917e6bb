//! HTTP request handlers
//!
//! This module contains all the request handlers for the API endpoints.

pub mod fingerprint;
pub mod health;
pub mod uploads;
pub mod verify;

pub use crate::state::AppState;
pub use fingerprint::{hash_handler, FileHashResult, HashResponse};
pub use health::{health, ready, HealthResponse, ReadyResponse};
pub use uploads::{
    delete_upload_handler, list_uploads_handler, DeleteUploadResponse, ListUploadsQuery,
    ListUploadsResponse, UploadRecord,
};
pub use verify::{
    verify_handler, verify_multi_handler, FileVerifyResult, VerifyMultiResponse, VerifyResponse,
};
