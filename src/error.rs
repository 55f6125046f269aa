//! Error types for the DCIM arranger
//!
//! Per-photo problems are not errors: they are collected as
//! [`GroupIssue`](crate::dcim::GroupIssue) and
//! [`ArrangeIssue`](crate::dcim::ArrangeIssue) values. The variants here are
//! for failures that stop a whole run.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for arranger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the arranger
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to scan {path}: {message}")]
    ScanFailed { path: PathBuf, message: String },

    #[error("Target already exists, refusing to overwrite: {target} (from {origin})")]
    TargetExists { origin: PathBuf, target: PathBuf },

    #[error("Failed to move {from} to {to}: {source}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write report {path}: {message}")]
    Report { path: PathBuf, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
