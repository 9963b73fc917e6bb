//! OpenAPI documentation configuration
//!
//! Generates the OpenAPI 3.0 specification for the Fixity registry API.

use utoipa::OpenApi;

use crate::handlers::{
    DeleteUploadResponse, FileHashResult, FileVerifyResult, HashResponse, HealthResponse,
    ListUploadsResponse, ReadyResponse, UploadRecord, VerifyMultiResponse, VerifyResponse,
};

/// Fixity registry API - OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fixity - File Integrity Registry API",
        version = "0.1.0",
        description = r#"
## File Integrity Registry

Fixity records the SHA-256 fingerprint of a file at a point in time and
answers, later, whether a candidate file is byte-identical to one it has seen.

### How It Works

1. **Register** files via `POST /hash`; each distinct content is recorded once
2. **Verify** candidates via `POST /verify-multi`, or compare one file against
   a known fingerprint via `POST /verify`
3. **Review** the registry via `GET /uploads`, newest first; pass the returned
   `snapshot` as `as_of` to page through a stable view
4. **Remove** records via `DELETE /uploads/{hash}`

A batch handles at most 10 files. A file that cannot be read gets its own
`error` entry without failing the rest of the batch.
"#,
        license(name = "MIT OR Apache-2.0")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    tags(
        (name = "Registry", description = "Register fingerprints and administer records"),
        (name = "Verification", description = "Check files against registered fingerprints"),
        (name = "Health", description = "Service health and readiness endpoints")
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::health::ready,
        crate::handlers::fingerprint::hash_handler,
        crate::handlers::verify::verify_multi_handler,
        crate::handlers::verify::verify_handler,
        crate::handlers::uploads::list_uploads_handler,
        crate::handlers::uploads::delete_upload_handler,
    ),
    components(
        schemas(
            HealthResponse,
            ReadyResponse,
            FileHashResult,
            HashResponse,
            FileVerifyResult,
            VerifyMultiResponse,
            VerifyResponse,
            UploadRecord,
            ListUploadsResponse,
            DeleteUploadResponse,
        )
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/hash",
            "/verify",
            "/verify-multi",
            "/uploads",
            "/uploads/{hash}",
            "/health",
            "/ready",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
