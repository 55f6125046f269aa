//! Recursive file scanning with extension filtering

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Lower-case extensions and strip a leading dot, so `.NEF` and `nef` match
pub fn normalize_extensions<I, S>(extensions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    extensions
        .into_iter()
        .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
        .collect()
}

/// Case-insensitive check of a path's extension against a normalized list
pub fn has_extension(path: &Path, normalized: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| normalized.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Absolute, symlink-free form of `path`, which need not exist yet.
///
/// The deepest existing ancestor is canonicalized and the missing tail is
/// appended unchanged.
pub fn canonical_lenient(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut existing = absolute.as_path();
    let mut tail = Vec::new();

    loop {
        match existing.canonicalize() {
            Ok(canonical) => {
                return Ok(tail.iter().rev().fold(canonical, |acc, part| acc.join(part)));
            }
            Err(e) => match (existing.parent(), existing.file_name()) {
                (Some(parent), Some(name)) => {
                    tail.push(name.to_os_string());
                    existing = parent;
                }
                _ => return Err(e),
            },
        }
    }
}

/// Whether `path` lies at or below `root`, after resolving both
pub fn is_within(path: &Path, root: &Path) -> std::io::Result<bool> {
    Ok(canonical_lenient(path)?.starts_with(canonical_lenient(root)?))
}

/// Collects files below a root whose extension is in an allow-list
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    /// Lower-cased extensions without the dot; empty means every file
    extensions: Vec<String>,
}

impl Scanner {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: normalize_extensions(extensions),
        }
    }

    /// Scanner that accepts every file
    pub fn all() -> Self {
        Self::default()
    }

    fn accepts(&self, path: &Path) -> bool {
        self.extensions.is_empty() || has_extension(path, &self.extensions)
    }

    /// Recursively list matching files below `root`, sorted by path.
    ///
    /// A missing root is an error; unreadable entries below it are skipped.
    pub fn scan(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(Error::ScanFailed {
                path: root.to_path_buf(),
                message: "not an existing directory".into(),
            });
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            let path = entry.path();
            if entry.file_type().is_file() && self.accepts(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        debug!(root = ?root, count = files.len(), "Scanned directory");
        Ok(files)
    }
}
