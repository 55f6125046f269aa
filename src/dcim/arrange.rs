//! Date arrangement with serial overflow detection
//!
//! Each series is split by capture date. Inside a date the photos are ordered
//! by capture time, and every time the file counter goes backwards on a new
//! folder or new timestamp an overflow round is counted:
//!
//! ```text
//! 100NIKON/DSC_0001.JPG  2024-08-17  overflow 0
//! 100NIKON/DSC_9999.JPG  2024-08-17  overflow 0
//! 101NIKON/DSC_0001.JPG  2024-08-17  overflow 1
//! ```
//!
//! When a date saw any overflow, the round number is written between prefix
//! and serial so target names stay unique: `DSC_09999.JPG`, `DSC_10001.JPG`.

use super::group::Series;
use super::photo::Photo;
use crate::time::{LookupErrorKind, TimeLookup};
use chrono::NaiveDateTime;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering as CmpOrdering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{Level, debug, info, span, warn};

/// Day key format used in target folder names
pub const DATE_KEY_FORMAT: &str = "%Y%m%d";

/// One planned move
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Arrangement {
    pub origin_path: PathBuf,
    pub target_path: PathBuf,
    /// `yyyyMMdd`
    pub capture_date: String,
    pub capture_time: NaiveDateTime,
    pub photo_serial: u32,
    /// 0 until the first wraparound of this date, then the round number
    pub overflow: u32,
}

/// Why a photo could not be placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArrangeIssueKind {
    FileNotFound,
    NoExifData,
    ReadFailed,
    InvalidTime,
    ParseFailed,
    DuplicateTarget,
}

impl From<LookupErrorKind> for ArrangeIssueKind {
    fn from(kind: LookupErrorKind) -> Self {
        match kind {
            LookupErrorKind::FileNotFound => ArrangeIssueKind::FileNotFound,
            LookupErrorKind::NoExifData => ArrangeIssueKind::NoExifData,
            LookupErrorKind::ReadFailed => ArrangeIssueKind::ReadFailed,
            LookupErrorKind::ParseFailed => ArrangeIssueKind::ParseFailed,
        }
    }
}

impl fmt::Display for ArrangeIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArrangeIssueKind::FileNotFound => "file-not-found",
            ArrangeIssueKind::NoExifData => "no-exif-data",
            ArrangeIssueKind::ReadFailed => "read-failed",
            ArrangeIssueKind::InvalidTime => "invalid-time",
            ArrangeIssueKind::ParseFailed => "parse-failed",
            ArrangeIssueKind::DuplicateTarget => "duplicate-target",
        };
        f.write_str(s)
    }
}

/// A photo left out of the arrangement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrangeIssue {
    pub origin_path: PathBuf,
    pub kind: ArrangeIssueKind,
    pub message: String,
}

/// Output of [`DateArranger::arrange`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArrangeResult {
    pub arrangement: Vec<Arrangement>,
    pub issues: Vec<ArrangeIssue>,
}

/// A photo whose capture time resolved
#[derive(Debug, Clone, Copy)]
struct PhotoWithDate<'a> {
    photo: &'a Photo,
    capture_time: NaiveDateTime,
}

impl PhotoWithDate<'_> {
    fn day_key(&self) -> String {
        self.capture_time.format(DATE_KEY_FORMAT).to_string()
    }
}

/// Plans date folders for a series below one output root
#[derive(Debug, Clone)]
pub struct DateArranger {
    output_root: PathBuf,
}

impl DateArranger {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Arrange one series.
    ///
    /// Capture times are looked up in parallel; everything after the lookups
    /// runs on the calling thread. A failing photo yields one issue and never
    /// affects its siblings.
    pub fn arrange<L>(&self, series: &Series, lookup: &L) -> ArrangeResult
    where
        L: TimeLookup + ?Sized,
    {
        let series_key = series.key();
        let _span = span!(Level::INFO, "arrange", series = %series_key).entered();
        info!(photos = series.photos.len(), "Arranging series");

        let mut result = ArrangeResult::default();
        let dated = resolve_capture_times(series, lookup, &mut result.issues);

        let mut by_date: BTreeMap<String, Vec<PhotoWithDate<'_>>> = BTreeMap::new();
        for photo in dated {
            by_date.entry(photo.day_key()).or_default().push(photo);
        }

        for (date, mut photos) in by_date {
            photos.sort_by(compare_within_date);
            let overflows = assign_overflow(&photos);
            let max_overflow = overflows.iter().copied().max().unwrap_or(0);
            let overflow_width = max_overflow.to_string().len();

            let folder = self
                .output_root
                .join(format!("{}-{}-{}", date, series.directory_suffix, series.prefix));
            let mut targets: HashSet<PathBuf> = HashSet::new();

            for (dated, overflow) in photos.iter().zip(overflows) {
                let photo = dated.photo;
                let overflow_segment = if max_overflow > 0 {
                    format!("{:0width$}", overflow, width = overflow_width)
                } else {
                    String::new()
                };
                let target_path = folder.join(format!(
                    "{}{}{:04}.{}",
                    photo.prefix, overflow_segment, photo.file_serial, photo.extension
                ));

                if !targets.insert(target_path.clone()) {
                    warn!(origin = ?photo.full_path, target = ?target_path, "Duplicate target path");
                    result.issues.push(ArrangeIssue {
                        origin_path: photo.full_path.clone(),
                        kind: ArrangeIssueKind::DuplicateTarget,
                        message: format!("Target path already assigned: {}", target_path.display()),
                    });
                    continue;
                }

                result.arrangement.push(Arrangement {
                    origin_path: photo.full_path.clone(),
                    target_path,
                    capture_date: date.clone(),
                    capture_time: dated.capture_time,
                    photo_serial: photo.file_serial,
                    overflow,
                });
            }

            debug!(date = %date, max_overflow, photos = photos.len(), "Arranged date group");
        }

        info!(
            arranged = result.arrangement.len(),
            issues = result.issues.len(),
            "Series arranged"
        );
        result
    }
}

/// Look up every photo in parallel and keep the ones with a usable time.
///
/// Results are collected in photo order, so the outcome does not depend on
/// which lookup finishes first.
fn resolve_capture_times<'a, L>(
    series: &'a Series,
    lookup: &L,
    issues: &mut Vec<ArrangeIssue>,
) -> Vec<PhotoWithDate<'a>>
where
    L: TimeLookup + ?Sized,
{
    let total = series.photos.len();
    let done = AtomicUsize::new(0);

    let lookups: Vec<_> = series
        .photos
        .par_iter()
        .map(|photo| {
            let outcome = lookup.lookup(&photo.full_path);
            let count = done.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(count, total, path = ?photo.full_path, "Read capture time");
            (photo, outcome)
        })
        .collect();

    let mut dated = Vec::with_capacity(lookups.len());
    for (photo, outcome) in lookups {
        match outcome {
            Err(e) => {
                warn!(path = ?photo.full_path, kind = %e.kind, "Capture time lookup failed");
                issues.push(ArrangeIssue {
                    origin_path: photo.full_path.clone(),
                    kind: e.kind.into(),
                    message: e.message,
                });
            }
            Ok(capture) => match capture.timestamp {
                Some(capture_time) => dated.push(PhotoWithDate {
                    photo,
                    capture_time,
                }),
                None => {
                    warn!(path = ?photo.full_path, "Invalid capture time");
                    issues.push(ArrangeIssue {
                        origin_path: photo.full_path.clone(),
                        kind: ArrangeIssueKind::InvalidTime,
                        message: format!(
                            "Invalid capture time: {}",
                            capture.raw.as_deref().unwrap_or("<missing>")
                        ),
                    });
                }
            },
        }
    }
    dated
}

/// Capture time, then directory serial, then file serial, then extension
fn compare_within_date(a: &PhotoWithDate<'_>, b: &PhotoWithDate<'_>) -> CmpOrdering {
    a.capture_time
        .cmp(&b.capture_time)
        .then(a.photo.directory_serial.cmp(&b.photo.directory_serial))
        .then(a.photo.file_serial.cmp(&b.photo.file_serial))
        .then_with(|| a.photo.extension.cmp(&b.photo.extension))
}

/// Overflow round for each photo of an already sorted date group.
///
/// The round goes up when the time or folder changed and the serial did not
/// move forward. It never goes back down within the group.
fn assign_overflow(photos: &[PhotoWithDate<'_>]) -> Vec<u32> {
    let mut overflow = 0;
    let mut last: Option<&PhotoWithDate<'_>> = None;
    let mut rounds = Vec::with_capacity(photos.len());

    for current in photos {
        if let Some(previous) = last
            && (current.capture_time != previous.capture_time
                || current.photo.directory_serial != previous.photo.directory_serial)
            && current.photo.file_serial <= previous.photo.file_serial
        {
            overflow += 1;
        }
        last = Some(current);
        rounds.push(overflow);
    }

    rounds
}
