//! Exit codes following sysexits.h conventions.
//!
//! These codes provide semantic meaning for different failure modes,
//! enabling scripts and CI systems to handle errors appropriately.

use std::fmt;
use std::io;

use fixity_core::RegistryError;

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line usage error (malformed fingerprint argument).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Data format error (fingerprint mismatch).
/// Maps to EX_DATAERR from sysexits.h.
pub const VERIFICATION_FAILED: i32 = 65;

/// Cannot open or read an input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// Raised by a command when a file's fingerprint differs from the expected one.
#[derive(Debug)]
pub struct Mismatch;

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fingerprint mismatch")
    }
}

impl std::error::Error for Mismatch {}

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    /// Classify an error by inspecting its cause chain.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        let code = if err.chain().any(|cause| cause.is::<Mismatch>()) {
            VERIFICATION_FAILED
        } else if err.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<RegistryError>(),
                Some(RegistryError::Validation(_))
            )
        }) {
            USAGE_ERROR
        } else if err.chain().any(|cause| {
            cause.is::<io::Error>()
                || matches!(cause.downcast_ref::<RegistryError>(), Some(RegistryError::Io(_)))
        }) {
            INPUT_ERROR
        } else {
            GENERAL_ERROR
        };

        Self {
            code,
            message: Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_mismatch_maps_to_verification_failed() {
        let err = anyhow::Error::new(Mismatch).context("report.pdf");
        assert_eq!(ExitCode::from_anyhow(&err).code, VERIFICATION_FAILED);
    }

    #[test]
    fn test_unreadable_file_maps_to_input_error() {
        let err: anyhow::Result<()> = Err(RegistryError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            "missing",
        )))
        .context("Failed to read file: missing.bin");
        assert_eq!(ExitCode::from_anyhow(&err.unwrap_err()).code, INPUT_ERROR);

        let err = anyhow::Error::new(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert_eq!(ExitCode::from_anyhow(&err).code, INPUT_ERROR);
    }

    #[test]
    fn test_malformed_fingerprint_maps_to_usage_error() {
        let err = anyhow::Error::new(RegistryError::validation("bad hex"));
        assert_eq!(ExitCode::from_anyhow(&err).code, USAGE_ERROR);
    }

    #[test]
    fn test_other_errors_are_general() {
        let err = anyhow::anyhow!("something else");
        let exit = ExitCode::from_anyhow(&err);
        assert_eq!(exit.code, GENERAL_ERROR);
        assert_eq!(exit.message.as_deref(), Some("something else"));
    }
}
