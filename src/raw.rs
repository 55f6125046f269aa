//! RAW companion planning
//!
//! After picking, a RAW file is worth keeping only while its JPEG survives:
//! - RAW next to a same-named JPEG moves into a `raw/` subfolder
//! - RAW without a JPEG is deleted
//! - RAW already in `raw/` stays while the parent folder still has the JPEG,
//!   otherwise it is deleted

use crate::scan::{has_extension, normalize_extensions};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Name of the folder RAW files are collected into
pub const RAW_FOLDER: &str = "raw";

const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// A move from one path to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Moves and deletes planned for RAW files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawPlan {
    pub moves: Vec<PlannedMove>,
    pub deletes: Vec<PathBuf>,
}

impl RawPlan {
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty() && self.deletes.is_empty()
    }
}

fn lower(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// Plan RAW moves and deletes from a flat file list.
///
/// Only paths whose extension is in `raw_extensions` are considered. JPEG
/// lookups are case-insensitive and only consult the given list.
pub fn plan_raw_companions<S: AsRef<str>>(paths: &[PathBuf], raw_extensions: &[S]) -> RawPlan {
    let known: HashSet<String> = paths.iter().map(|p| lower(p)).collect();
    let raw_extensions = normalize_extensions(raw_extensions);

    let has_jpeg = |dir: &Path, stem: &str| {
        JPEG_EXTENSIONS
            .iter()
            .any(|ext| known.contains(&lower(&dir.join(format!("{stem}.{ext}")))))
    };

    let mut plan = RawPlan::default();
    for raw_path in paths {
        if !has_extension(raw_path, &raw_extensions) {
            continue;
        }

        let (Some(dir), Some(stem), Some(file_name)) = (
            raw_path.parent(),
            raw_path.file_stem().and_then(|s| s.to_str()),
            raw_path.file_name(),
        ) else {
            continue;
        };

        let in_raw_folder = dir
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.eq_ignore_ascii_case(RAW_FOLDER));

        if in_raw_folder {
            let parent = dir.parent().unwrap_or(dir);
            if !has_jpeg(parent, stem) {
                plan.deletes.push(raw_path.clone());
            }
        } else if has_jpeg(dir, stem) {
            plan.moves.push(PlannedMove {
                from: raw_path.clone(),
                to: dir.join(RAW_FOLDER).join(file_name),
            });
        } else {
            plan.deletes.push(raw_path.clone());
        }
    }

    plan
}
