//! Multipart form parsing helpers
//!
//! Two ways of consuming a `multipart/form-data` upload:
//! - [`BatchParts`] walks the file parts of a batch one at a time, streaming
//!   each into the registry without buffering it
//! - [`MultipartFields`] buffers a single `file` part alongside text fields,
//!   for requests that need a text field before the file can be judged

use std::collections::HashMap;

use axum::extract::multipart::Field;
use axum::extract::Multipart;
use fixity_core::MAX_BATCH_FILES;

use crate::error::ApiError;
use crate::validation::{upload_filename, validate_file_size};

/// Sequential cursor over the file parts of a batch upload.
///
/// Drive it with [`BatchParts::next_part`] and keep only the parts
/// [`BatchParts::accept`] names. Text parts are skipped; at most
/// [`MAX_BATCH_FILES`] file parts are accepted and the rest of the body is
/// left unread.
///
/// ```ignore
/// let mut parts = BatchParts::default();
/// while let Some(field) = parts.next_part(&mut multipart).await? {
///     let Some(filename) = parts.accept(&field) else { continue };
///     // stream `field` into the registry
/// }
/// ```
#[derive(Debug, Default)]
pub struct BatchParts {
    accepted: usize,
}

impl BatchParts {
    /// Next raw part, or `None` once the body or the batch cap is exhausted.
    ///
    /// A malformed body is a 400 when no file has been accepted yet. After
    /// that the cursor just stops, so files already processed still get
    /// their outcomes.
    pub async fn next_part<'a>(
        &self,
        multipart: &'a mut Multipart,
    ) -> Result<Option<Field<'a>>, ApiError> {
        if self.accepted >= MAX_BATCH_FILES {
            tracing::debug!(cap = MAX_BATCH_FILES, "Batch cap reached, ignoring remaining parts");
            return Ok(None);
        }

        match multipart.next_field().await {
            Ok(field) => Ok(field),
            Err(e) if self.accepted == 0 => Err(ApiError::bad_request(format!(
                "Failed to parse multipart: {}",
                e
            ))),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    processed = self.accepted,
                    "Multipart body ended abruptly, returning partial results"
                );
                Ok(None)
            }
        }
    }

    /// Count `field` toward the batch if it is a file part, returning the
    /// filename to record for it.
    pub fn accept(&mut self, field: &Field<'_>) -> Option<String> {
        if field.file_name().is_none() {
            tracing::debug!(field = ?field.name(), "Skipping non-file part");
            return None;
        }
        self.accepted += 1;
        Some(upload_filename(field.file_name()))
    }

    /// Number of file parts accepted so far.
    pub fn accepted(&self) -> usize {
        self.accepted
    }
}

/// Represents a file uploaded via multipart form
#[derive(Debug, Clone)]
pub struct FileField {
    /// File data bytes
    pub data: Vec<u8>,
    /// Original filename from the multipart field (if provided)
    pub file_name: Option<String>,
}

impl FileField {
    /// Filename to record for this part.
    pub fn filename(&self) -> String {
        upload_filename(self.file_name.as_deref())
    }
}

/// Parsed multipart form fields
///
/// Provides structured access to the `file` field and text fields of a
/// multipart/form-data request.
#[derive(Debug)]
pub struct MultipartFields {
    /// File field (named "file")
    file: Option<FileField>,
    /// Text fields indexed by name
    text_fields: HashMap<String, String>,
}

impl MultipartFields {
    /// Parse all fields from a multipart request
    ///
    /// # Arguments
    /// * `multipart` - The Axum multipart extractor
    /// * `max_file_size` - Maximum allowed file size in bytes
    ///
    /// # Example
    /// ```ignore
    /// let fields = MultipartFields::parse(&mut multipart, config.max_file_bytes()).await?;
    /// let file = fields.take_file()?;
    /// ```
    pub async fn parse(multipart: &mut Multipart, max_file_size: u64) -> Result<Self, ApiError> {
        let mut file: Option<FileField> = None;
        let mut text_fields = HashMap::new();

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to parse multipart: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();

            if name == "file" {
                let file_name = field.file_name().map(|s| s.to_string());

                // Read chunk by chunk so an oversized file is rejected early
                let mut data = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?
                {
                    data.extend_from_slice(&chunk);
                    validate_file_size(data.len() as u64, max_file_size)?;
                }

                file = Some(FileField { data, file_name });
            } else {
                let value = field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed to read field '{}': {}", name, e))
                })?;
                text_fields.insert(name, value);
            }
        }

        Ok(Self { file, text_fields })
    }

    /// Take the file field (required)
    ///
    /// Returns an error if no file was uploaded.
    pub fn take_file(&mut self) -> Result<FileField, ApiError> {
        self.file.take().ok_or_else(|| {
            ApiError::bad_request("No file provided. Use 'file' field in multipart form.")
        })
    }

    /// Get a text field value
    ///
    /// Returns `None` if the field is not present.
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.text_fields.get(name).map(|s| s.as_str())
    }

    /// Get a text field that must be present and non-blank
    pub fn require_text(&self, name: &str) -> Result<&str, ApiError> {
        self.get_text(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::bad_request(format!("Missing '{}' field", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_text() {
        let mut text_fields = HashMap::new();
        text_fields.insert("hash".to_string(), "abc".to_string());

        let fields = MultipartFields {
            file: None,
            text_fields,
        };

        assert_eq!(fields.get_text("hash"), Some("abc"));
        assert_eq!(fields.get_text("missing"), None);
    }

    #[test]
    fn test_require_text_rejects_blank() {
        let mut text_fields = HashMap::new();
        text_fields.insert("hash".to_string(), "   ".to_string());

        let fields = MultipartFields {
            file: None,
            text_fields,
        };

        assert!(fields.require_text("hash").is_err());
        assert!(fields.require_text("missing").is_err());
    }

    #[test]
    fn test_require_file_missing() {
        let mut fields = MultipartFields {
            file: None,
            text_fields: HashMap::new(),
        };

        assert!(fields.take_file().is_err());
    }

    #[test]
    fn test_file_field_filename_fallback() {
        let file = FileField {
            data: vec![],
            file_name: None,
        };
        assert_eq!(file.filename(), crate::validation::FALLBACK_FILENAME);
    }
}
