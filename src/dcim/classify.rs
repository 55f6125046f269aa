//! DCF path classification
//!
//! Splits a path like `/card/DCIM/100NIKON/DSC_0001.JPG` into its directory
//! identity (`100`, `NIKON`) and file identity (`DSC_`, `1`, `JPG`).

use super::photo::{GroupIssue, GroupIssueKind, Photo};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::trace;

/// `NNNAAAAA`: three digit folder number followed by a 3-5 character suffix
static DIRECTORY_PATTERN: OnceLock<Regex> = OnceLock::new();

/// `PREFIX####.EXT`: 3-5 character prefix, four digit counter, extension
static FILE_NAME_PATTERN: OnceLock<Regex> = OnceLock::new();

fn directory_pattern() -> &'static Regex {
    DIRECTORY_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^([0-9]{3})([A-Z0-9_]{3,5})$").expect("directory pattern is valid")
    })
}

fn file_name_pattern() -> &'static Regex {
    FILE_NAME_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^([A-Z0-9_]{3,5})([0-9]{4})\.([A-Z0-9]+)$")
            .expect("file name pattern is valid")
    })
}

/// Identity of the folder a photo lives in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryIdentity {
    pub serial: u32,
    pub suffix: String,
    pub is_dcf: bool,
}

/// Identity carried by the file name itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIdentity {
    pub prefix: String,
    pub serial: u32,
    pub extension: String,
}

/// Classify a directory name.
///
/// Names that are not DCF folders keep the raw name as suffix and serial 0,
/// so they still group on their own.
pub fn classify_directory(name: &str) -> DirectoryIdentity {
    if let Some(caps) = directory_pattern().captures(name)
        && let Ok(serial) = caps[1].parse::<u32>()
    {
        return DirectoryIdentity {
            serial,
            suffix: caps[2].to_string(),
            is_dcf: true,
        };
    }

    DirectoryIdentity {
        serial: 0,
        suffix: name.to_string(),
        is_dcf: false,
    }
}

/// Classify a file name, returning `None` when it does not follow `PREFIX####.EXT`
pub fn classify_file_name(name: &str) -> Option<FileIdentity> {
    let caps = file_name_pattern().captures(name)?;
    let serial = caps[2].parse::<u32>().ok()?;

    Some(FileIdentity {
        prefix: caps[1].to_string(),
        serial,
        extension: caps[3].to_uppercase(),
    })
}

/// Classify a full path into a [`Photo`], or explain why it cannot be one.
///
/// Only the file name can reject a path. A missing parent name classifies
/// as an empty non-DCF directory; non-UTF-8 names are read lossily.
pub fn classify_path(path: &Path) -> Result<(Photo, bool), GroupIssue> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let Some(file) = classify_file_name(&file_name) else {
        return Err(GroupIssue::new(
            path,
            GroupIssueKind::InvalidFileSerial,
            format!("File name does not follow the DCF naming rule: {}", path.display()),
        ));
    };

    let dir_name = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    let directory = classify_directory(&dir_name);
    trace!(?path, dcf = directory.is_dcf, "Classified photo path");

    let photo = Photo {
        full_path: path.to_path_buf(),
        file_name,
        extension: file.extension,
        directory_suffix: directory.suffix,
        directory_serial: directory.serial,
        prefix: file.prefix,
        file_serial: file.serial,
    };

    Ok((photo, directory.is_dcf))
}
