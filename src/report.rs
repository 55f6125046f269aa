//! JSON reports written before anything is moved

use crate::dcim::{ArrangeIssue, Arrangement, GroupIssue};
use crate::error::{Error, Result};
use crate::raw::{PlannedMove, RawPlan};
use chrono::Local;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes pretty-printed JSON files into a report directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `value` to `<dir>/<label>_<timestamp>.json` and return the path
    pub fn dump<T: Serialize + ?Sized>(&self, label: &str, value: &T) -> Result<PathBuf> {
        let stamp = Local::now().format("%Y%m%d_%H%M%S_%3f");
        let path = self.dir.join(format!("{}_{}.json", sanitize_label(label), stamp));

        fs::create_dir_all(&self.dir).map_err(|e| Error::Report {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let content = serde_json::to_string_pretty(value)?;
        fs::write(&path, content).map_err(|e| Error::Report {
            path: path.clone(),
            message: e.to_string(),
        })?;

        info!(report = %path.display(), "Report written");
        Ok(path)
    }
}

fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Grouping issues as dumped when grouping rejects paths
#[derive(Debug, Serialize)]
pub struct GroupingReport<'a> {
    pub series_count: usize,
    pub issues: &'a [GroupIssue],
}

/// Arrangement issues of one series
#[derive(Debug, Serialize)]
pub struct SeriesIssueReport<'a> {
    pub series: String,
    pub issues: &'a [ArrangeIssue],
}

/// Per target folder overview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectorySummary {
    pub count: usize,
    pub max_overflow: u32,
    pub first: PathBuf,
    pub last: PathBuf,
}

/// Overview of a whole arrangement plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub total: usize,
    pub dir_count: usize,
    pub dirs: BTreeMap<String, DirectorySummary>,
}

/// One line of a target folder report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedPhoto {
    pub from: PathBuf,
    pub to: PathBuf,
    /// `HH:MM:SS`
    pub time: String,
}

/// Everything planned for one target folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryDetail {
    pub max_overflow: u32,
    pub total: usize,
    pub photos: Vec<PlannedPhoto>,
}

fn target_folder_name(arrangement: &Arrangement) -> String {
    arrangement
        .target_path
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn by_target_folder(arrangements: &[Arrangement]) -> BTreeMap<String, Vec<&Arrangement>> {
    let mut folders: BTreeMap<String, Vec<&Arrangement>> = BTreeMap::new();
    for arrangement in arrangements {
        folders
            .entry(target_folder_name(arrangement))
            .or_default()
            .push(arrangement);
    }
    folders
}

/// Summarize a plan per target folder
pub fn summarize_plan(arrangements: &[Arrangement]) -> PlanSummary {
    let dirs: BTreeMap<String, DirectorySummary> = by_target_folder(arrangements)
        .into_iter()
        .filter_map(|(dir, items)| {
            let first = items.first()?;
            let last = items.last()?;
            Some((
                dir,
                DirectorySummary {
                    count: items.len(),
                    max_overflow: items.iter().map(|a| a.overflow).max().unwrap_or(0),
                    first: first.target_path.clone(),
                    last: last.target_path.clone(),
                },
            ))
        })
        .collect();

    PlanSummary {
        total: arrangements.len(),
        dir_count: dirs.len(),
        dirs,
    }
}

/// Detailed listing per target folder
pub fn directory_details(arrangements: &[Arrangement]) -> BTreeMap<String, DirectoryDetail> {
    by_target_folder(arrangements)
        .into_iter()
        .map(|(dir, items)| {
            let detail = DirectoryDetail {
                max_overflow: items.iter().map(|a| a.overflow).max().unwrap_or(0),
                total: items.len(),
                photos: items
                    .iter()
                    .map(|a| PlannedPhoto {
                        from: a.origin_path.clone(),
                        to: a.target_path.clone(),
                        time: a.capture_time.format("%H:%M:%S").to_string(),
                    })
                    .collect(),
            };
            (dir, detail)
        })
        .collect()
}

/// Outcome of one card import
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportReport {
    pub source: PathBuf,
    pub target: PathBuf,
    pub copied: usize,
    pub unchanged: usize,
    pub duration_sec: f64,
}

/// RAW plan grouped by source folder relative to the scan root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawPlanReport {
    pub deletes: BTreeMap<String, Vec<PathBuf>>,
    pub moves: BTreeMap<String, Vec<PlannedMove>>,
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

fn folder_key(root: &Path, path: &Path) -> String {
    let dir = path.parent().unwrap_or(path);
    let rel = relative_to(root, dir);
    if rel.as_os_str().is_empty() {
        ".".to_string()
    } else {
        rel.to_string_lossy().into_owned()
    }
}

/// Group a RAW plan by folder so the report reads folder by folder
pub fn group_raw_plan(root: &Path, plan: &RawPlan) -> RawPlanReport {
    let mut report = RawPlanReport::default();

    for path in &plan.deletes {
        report
            .deletes
            .entry(folder_key(root, path))
            .or_default()
            .push(relative_to(root, path));
    }

    for planned in &plan.moves {
        report
            .moves
            .entry(folder_key(root, &planned.from))
            .or_default()
            .push(PlannedMove {
                from: relative_to(root, &planned.from),
                to: relative_to(root, &planned.to),
            });
    }

    for files in report.deletes.values_mut() {
        files.sort();
    }
    for moves in report.moves.values_mut() {
        moves.sort_by(|a, b| a.to.cmp(&b.to).then_with(|| a.from.cmp(&b.from)));
    }

    report
}
