//! Hash command implementation.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use fixity_core::{fingerprint_reader, Fingerprint};
use serde_json::json;
use tracing::{debug, warn};

use crate::exit_codes::{ExitCode, INPUT_ERROR};

/// Fingerprint one file from disk.
pub fn fingerprint_file(path: &Path) -> Result<Fingerprint> {
    let file =
        File::open(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let hash = fingerprint_reader(file)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    debug!(path = %path.display(), file_hash = %hash, "Fingerprinted file");
    Ok(hash)
}

/// Execute the hash command.
///
/// Prints `<fingerprint>  <file>` per file, the layout `sha256sum` uses.
/// Unreadable files are reported and skipped; the exit code is then
/// [`INPUT_ERROR`].
pub fn execute(files: Vec<PathBuf>, as_json: bool, quiet: bool) -> Result<ExitCode> {
    let mut failed = 0usize;
    let mut entries = Vec::with_capacity(files.len());

    for path in &files {
        match fingerprint_file(path) {
            Ok(hash) => {
                if as_json {
                    entries.push(json!({
                        "file": path.display().to_string(),
                        "file_hash": hash.to_hex(),
                    }));
                } else {
                    println!("{}  {}", hash, path.display());
                }
            }
            Err(e) => {
                failed += 1;
                warn!(path = %path.display(), error = %e, "Skipping unreadable file");
                if as_json {
                    entries.push(json!({
                        "file": path.display().to_string(),
                        "error": format!("{e:#}"),
                    }));
                } else if !quiet {
                    eprintln!("{} {:#}", "error:".red().bold(), e);
                }
            }
        }
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    }

    if failed > 0 {
        Ok(ExitCode::error(
            INPUT_ERROR,
            format!("{} of {} file(s) could not be read", failed, files.len()),
        ))
    } else {
        Ok(ExitCode::success())
    }
}
