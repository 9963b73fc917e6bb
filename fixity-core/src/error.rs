use thiserror::Error;

use crate::fingerprint::Fingerprint;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fingerprint already registered: {0}")]
    Conflict(Fingerprint),

    #[error("Fingerprint not found: {0}")]
    NotFound(Fingerprint),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl RegistryError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Whether this error is confined to a single file of a batch.
    ///
    /// Storage failures are not: they abort the whole request.
    pub fn is_per_file(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
