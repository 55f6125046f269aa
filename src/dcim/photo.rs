//! Photo identity derived from a DCIM path

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A photo whose path follows the `PREFIX####.EXT` naming convention
///
/// Created once by the classifier and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Photo {
    /// Source path as supplied by the scanner
    pub full_path: PathBuf,
    /// File name including extension, e.g. `DSC_0001.JPG`
    pub file_name: String,
    /// Upper-cased extension without the dot, e.g. `JPG`
    pub extension: String,
    /// `NIKON` for `100NIKON`, or the whole directory name for non-DCF folders
    pub directory_suffix: String,
    /// `100` for `100NIKON`, `0` for non-DCF folders
    pub directory_serial: u32,
    /// File name prefix with case preserved, e.g. `DSC_`
    pub prefix: String,
    /// The four-digit counter, e.g. `1` for `DSC_0001.JPG`
    pub file_serial: u32,
}

/// Why a path was rejected during grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupIssueKind {
    /// File name does not match `PREFIX####.EXT`
    InvalidFileSerial,
    /// Reserved for directory layouts the grouping refuses; not raised today
    InvalidDirectory,
}

impl fmt::Display for GroupIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupIssueKind::InvalidFileSerial => write!(f, "invalid-file-serial"),
            GroupIssueKind::InvalidDirectory => write!(f, "invalid-directory"),
        }
    }
}

/// A path that could not become a [`Photo`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupIssue {
    pub file_path: PathBuf,
    pub kind: GroupIssueKind,
    pub reason: String,
}

impl GroupIssue {
    pub fn new(file_path: impl Into<PathBuf>, kind: GroupIssueKind, reason: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            kind,
            reason: reason.into(),
        }
    }
}
