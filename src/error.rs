//! Error types and process exit codes.

use std::path::PathBuf;

use thiserror::Error;

/// Process exit codes for the leakcheck CLI.
pub mod exit_code {
    /// No leaks detected.
    pub const CLEAN: i32 = 0;
    /// At least one leak was reported.
    pub const ISSUES_FOUND: i32 = 1;
    /// Fatal error: unusable arguments or a failed scan.
    pub const FATAL: i32 = 1;
}

/// Errors from file discovery. Only a failed top-level path is fatal;
/// unreadable entries inside a directory walk are skipped.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
