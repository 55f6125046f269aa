//! Card import
//!
//! Mirrors `<card>/DCIM/` into the import folder, keeping the numbered
//! camera folders. A file whose copy already has the same size and
//! modification time is skipped, so an interrupted import can just be run
//! again.

use crate::error::{Error, Result};
use crate::raw::PlannedMove;
use crate::scan::{has_extension, normalize_extensions};
use filetime::FileTime;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Folder on the card holding the camera output
pub const DCIM_FOLDER: &str = "DCIM";

/// System folders some hosts leave on removable media
const EXCLUDED_NAMES: &[&str] = &[".Spotlight-V100", ".Trashes"];

const EXCLUDED_EXTENSIONS: &[&str] = &["tmp"];

/// Copies needed to bring the import folder up to date with a card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportPlan {
    pub copies: Vec<PlannedMove>,
    /// Card files whose copy is already current
    pub unchanged: Vec<PathBuf>,
}

impl ImportPlan {
    pub fn is_empty(&self) -> bool {
        self.copies.is_empty()
    }
}

fn is_excluded(entry: &DirEntry, excluded_extensions: &[String]) -> bool {
    let name = entry.file_name().to_string_lossy();
    EXCLUDED_NAMES.iter().any(|n| *n == name)
        || (entry.file_type().is_file() && has_extension(entry.path(), excluded_extensions))
}

fn is_current(source: &fs::Metadata, target: &Path) -> bool {
    let Ok(existing) = fs::metadata(target) else {
        return false;
    };
    existing.len() == source.len()
        && FileTime::from_last_modification_time(&existing).unix_seconds()
            == FileTime::from_last_modification_time(source).unix_seconds()
}

/// Plan copying `<card>/DCIM/**` to `<target>/**`.
///
/// A card without a `DCIM` folder is an error. Unreadable entries are
/// logged and skipped.
pub fn plan_import(card: &Path, target: &Path) -> Result<ImportPlan> {
    let dcim = card.join(DCIM_FOLDER);
    if !dcim.is_dir() {
        return Err(Error::ScanFailed {
            path: dcim,
            message: format!("no {} folder on the card", DCIM_FOLDER),
        });
    }

    let excluded_extensions = normalize_extensions(EXCLUDED_EXTENSIONS);
    let mut plan = ImportPlan::default();

    let walker = WalkDir::new(&dcim)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_excluded(e, &excluded_extensions));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(path = ?entry.path(), error = %e, "Skipping file without metadata");
                continue;
            }
        };
        let Ok(relative) = entry.path().strip_prefix(&dcim) else {
            continue;
        };

        let to = target.join(relative);
        if is_current(&metadata, &to) {
            debug!(path = ?entry.path(), "Already imported");
            plan.unchanged.push(entry.into_path());
        } else {
            plan.copies.push(PlannedMove {
                from: entry.into_path(),
                to,
            });
        }
    }

    info!(
        copies = plan.copies.len(),
        unchanged = plan.unchanged.len(),
        "Import plan ready"
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execute::execute_copies;
    use tempfile::TempDir;

    fn card_with(files: &[&str]) -> TempDir {
        let card = TempDir::new().unwrap();
        for file in files {
            let path = card.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, file.as_bytes()).unwrap();
        }
        card
    }

    #[test]
    fn test_plan_mirrors_dcim_tree() {
        let card = card_with(&[
            "DCIM/100NIKON/DSC_0001.JPG",
            "DCIM/101NIKON/DSC_0002.NEF",
            "MISC/AUTPRINT.MRK",
        ]);
        let target = TempDir::new().unwrap();

        let plan = plan_import(card.path(), target.path()).unwrap();

        let targets: Vec<PathBuf> = plan.copies.iter().map(|c| c.to.clone()).collect();
        assert_eq!(
            targets,
            vec![
                target.path().join("100NIKON/DSC_0001.JPG"),
                target.path().join("101NIKON/DSC_0002.NEF"),
            ]
        );
        assert!(plan.unchanged.is_empty());
    }

    #[test]
    fn test_plan_skips_host_litter() {
        let card = card_with(&[
            "DCIM/100NIKON/DSC_0001.JPG",
            "DCIM/100NIKON/DSC_0001.tmp",
            "DCIM/.Trashes/501/DSC_0009.JPG",
            "DCIM/.Spotlight-V100/Store-V2/index",
        ]);
        let target = TempDir::new().unwrap();

        let plan = plan_import(card.path(), target.path()).unwrap();

        assert_eq!(plan.copies.len(), 1);
        assert!(plan.copies[0].from.ends_with("100NIKON/DSC_0001.JPG"));
    }

    #[test]
    fn test_second_import_finds_nothing_new() {
        let card = card_with(&["DCIM/100NIKON/DSC_0001.JPG", "DCIM/100NIKON/DSC_0002.JPG"]);
        let target = TempDir::new().unwrap();

        let first = plan_import(card.path(), target.path()).unwrap();
        execute_copies(&first.copies, false).unwrap();
        fs::write(card.path().join("DCIM/100NIKON/DSC_0003.JPG"), "new shot").unwrap();

        let second = plan_import(card.path(), target.path()).unwrap();

        assert_eq!(second.unchanged.len(), 2);
        assert_eq!(second.copies.len(), 1);
        assert!(second.copies[0].to.ends_with("100NIKON/DSC_0003.JPG"));
    }

    #[test]
    fn test_changed_copy_is_refreshed() {
        let card = card_with(&["DCIM/100NIKON/DSC_0001.JPG"]);
        let target = TempDir::new().unwrap();
        let stale = target.path().join("100NIKON/DSC_0001.JPG");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "truncated").unwrap();

        let plan = plan_import(card.path(), target.path()).unwrap();

        assert_eq!(plan.copies.len(), 1);
        assert_eq!(plan.copies[0].to, stale);
    }

    #[test]
    fn test_card_without_dcim() {
        let card = card_with(&["MISC/AUTPRINT.MRK"]);
        let target = TempDir::new().unwrap();

        let err = plan_import(card.path(), target.path()).unwrap_err();

        assert!(matches!(err, Error::ScanFailed { .. }));
    }
}
