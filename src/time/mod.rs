//! Capture time lookup
//!
//! The arranger does not read metadata itself. It is handed a [`TimeLookup`]
//! which resolves a photo path to its capture time, or to one of a small set
//! of typed failures.

pub mod exif;

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

pub use exif::ExifTimeLookup;

/// Kind of failure a lookup can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LookupErrorKind {
    FileNotFound,
    NoExifData,
    ReadFailed,
    ParseFailed,
}

impl fmt::Display for LookupErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LookupErrorKind::FileNotFound => "file-not-found",
            LookupErrorKind::NoExifData => "no-exif-data",
            LookupErrorKind::ReadFailed => "read-failed",
            LookupErrorKind::ParseFailed => "parse-failed",
        };
        f.write_str(s)
    }
}

/// A failed lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct LookupError {
    pub kind: LookupErrorKind,
    pub message: String,
}

impl LookupError {
    pub fn new(kind: LookupErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Metadata was readable; the capture time may still be missing or garbage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureTime {
    /// `None` when no usable timestamp was found
    pub timestamp: Option<NaiveDateTime>,
    /// The raw tag value, kept for issue messages
    pub raw: Option<String>,
}

impl CaptureTime {
    pub fn at(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp: Some(timestamp),
            raw: None,
        }
    }

    pub fn invalid(raw: impl Into<String>) -> Self {
        Self {
            timestamp: None,
            raw: Some(raw.into()),
        }
    }

    pub fn missing() -> Self {
        Self {
            timestamp: None,
            raw: None,
        }
    }
}

/// Resolves the capture time of one photo
///
/// Lookups for a series are issued in parallel, hence `Sync`.
pub trait TimeLookup: Sync {
    fn lookup(&self, path: &Path) -> Result<CaptureTime, LookupError>;
}

impl<F> TimeLookup for F
where
    F: Fn(&Path) -> Result<CaptureTime, LookupError> + Sync,
{
    fn lookup(&self, path: &Path) -> Result<CaptureTime, LookupError> {
        self(path)
    }
}
