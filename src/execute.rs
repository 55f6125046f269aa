//! Plan execution
//!
//! Moves never overwrite: an existing target stops the run before anything
//! else is touched for that item. Imports copy, and may refresh an outdated
//! copy in the import folder.

use crate::dcim::Arrangement;
use crate::error::{Error, Result};
use crate::raw::PlannedMove;
use filetime::FileTime;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

impl From<&Arrangement> for PlannedMove {
    fn from(arrangement: &Arrangement) -> Self {
        PlannedMove {
            from: arrangement.origin_path.clone(),
            to: arrangement.target_path.clone(),
        }
    }
}

/// Counts of what an execution did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub moved: usize,
    pub copied: usize,
    pub deleted: usize,
    /// Items that a dry run would have handled
    pub planned: usize,
}

/// Move each file to its target, creating target folders as needed.
///
/// Stops at the first target that already exists or the first failed move.
pub fn execute_moves(moves: &[PlannedMove], dry_run: bool) -> Result<ExecutionSummary> {
    let mut summary = ExecutionSummary::default();
    let total = moves.len();

    for planned in moves {
        if planned.to.exists() {
            return Err(Error::TargetExists {
                origin: planned.from.clone(),
                target: planned.to.clone(),
            });
        }

        if dry_run {
            info!(from = ?planned.from, to = ?planned.to, "Would move file");
            summary.planned += 1;
            continue;
        }

        if let Some(parent) = planned.to.parent() {
            fs::create_dir_all(parent)?;
        }
        move_file(&planned.from, &planned.to).map_err(|source| Error::MoveFailed {
            from: planned.from.clone(),
            to: planned.to.clone(),
            source,
        })?;

        summary.moved += 1;
        info!(
            from = ?planned.from,
            to = ?planned.to,
            progress = %format!("{}/{}", summary.moved, total),
            "Moved file"
        );
    }

    Ok(summary)
}

/// Copy each file to its target, replacing an outdated copy.
///
/// Sources are left in place and keep their modification time on the copy.
pub fn execute_copies(copies: &[PlannedMove], dry_run: bool) -> Result<ExecutionSummary> {
    let mut summary = ExecutionSummary::default();
    let total = copies.len();

    for planned in copies {
        if dry_run {
            info!(from = ?planned.from, to = ?planned.to, "Would copy file");
            summary.planned += 1;
            continue;
        }

        if let Some(parent) = planned.to.parent() {
            fs::create_dir_all(parent)?;
        }
        copy_file(&planned.from, &planned.to)
            .and_then(|()| preserve_mtime(&planned.from, &planned.to))
            .map_err(|source| Error::CopyFailed {
                from: planned.from.clone(),
                to: planned.to.clone(),
                source,
            })?;

        summary.copied += 1;
        debug!(
            from = ?planned.from,
            progress = %format!("{}/{}", summary.copied, total),
            "Copied file"
        );
    }

    Ok(summary)
}

/// Delete each listed file
pub fn execute_deletes(paths: &[PathBuf], dry_run: bool) -> Result<ExecutionSummary> {
    let mut summary = ExecutionSummary::default();

    for path in paths {
        if dry_run {
            info!(?path, "Would delete file");
            summary.planned += 1;
            continue;
        }
        fs::remove_file(path)?;
        summary.deleted += 1;
        debug!(?path, "Deleted file");
    }

    Ok(summary)
}

/// Rename, falling back to copy + delete across filesystems
fn move_file(source: &Path, dest: &Path) -> std::io::Result<()> {
    if fs::rename(source, dest).is_ok() {
        return Ok(());
    }

    copy_file(source, dest)?;
    preserve_mtime(source, dest)?;
    fs::remove_file(source)
}

fn preserve_mtime(source: &Path, dest: &Path) -> std::io::Result<()> {
    let metadata = fs::metadata(source)?;
    filetime::set_file_mtime(dest, FileTime::from_last_modification_time(&metadata))
}

/// Copy file with buffered I/O for efficiency
fn copy_file(source: &Path, dest: &Path) -> std::io::Result<()> {
    let src_file = File::open(source)?;
    let dest_file = File::create(dest)?;

    let mut reader = BufReader::with_capacity(256 * 1024, src_file);
    let mut writer = BufWriter::with_capacity(256 * 1024, dest_file);

    let mut buffer = vec![0u8; 256 * 1024];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read])?;
    }

    writer.flush()
}
