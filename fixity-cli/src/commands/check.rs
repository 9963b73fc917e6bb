//! Check command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use fixity_core::Fingerprint;
use tracing::info;

use super::hash::fingerprint_file;
use crate::exit_codes::{ExitCode, Mismatch};

/// Execute the check command.
///
/// Succeeds only when the file's fingerprint equals `expected`, compared
/// without regard to letter case.
pub fn execute(file: PathBuf, expected: String, quiet: bool) -> Result<ExitCode> {
    let expected: Fingerprint = expected
        .trim()
        .parse()
        .with_context(|| format!("Invalid fingerprint argument: {}", expected.trim()))?;

    let actual = fingerprint_file(&file)?;

    if actual == expected {
        info!(path = %file.display(), file_hash = %actual, "Fingerprint matches");
        if !quiet {
            println!("{} {}", "MATCH".green().bold(), file.display());
        }
        return Ok(ExitCode::success());
    }

    info!(
        path = %file.display(),
        expected = %expected,
        actual = %actual,
        "Fingerprint mismatch"
    );
    if !quiet {
        println!("{} {}", "MISMATCH".red().bold(), file.display());
        println!("   {} {}", "Expected:".dimmed(), expected);
        println!("   {} {}", "Got:".dimmed(), actual);
    }

    Err(anyhow::Error::new(Mismatch).context(format!("{} has been modified", file.display())))
}
