//! Fixity CLI - compute and check file fingerprints.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;

use exit_codes::ExitCode;

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   Success
  1   General error
  64  Malformed fingerprint argument
  65  Fingerprint mismatch
  66  Input file missing or unreadable";

#[derive(Parser)]
#[command(name = "fixity")]
#[command(author, version, about = "File fingerprinting for the Fixity integrity registry", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress human-readable output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the SHA-256 fingerprint of each file
    Hash {
        /// Files to fingerprint
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Emit a JSON array instead of text lines
        #[arg(long)]
        json: bool,
    },

    /// Check a file against an expected fingerprint
    Check {
        /// Path to the file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Expected hex fingerprint (64 hex digits, either case)
        #[arg(value_name = "HASH")]
        hash: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Hash { files, json } => commands::hash::execute(files, json, cli.quiet),
        Commands::Check { file, hash } => commands::check::execute(file, hash, cli.quiet),
    };

    let exit = result.unwrap_or_else(|e| ExitCode::from_anyhow(&e));

    if let Some(message) = &exit.message {
        if !cli.quiet {
            eprintln!("{} {}", "error:".red().bold(), message);
        }
    }

    std::process::exit(exit.code);
}
