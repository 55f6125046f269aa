//! Arrangement planning across series
//!
//! Series are handled one after another; only the capture time lookups
//! inside a single series run in parallel. That keeps the number of files
//! being read at once bounded by one series.

use crate::dcim::{ArrangeIssue, Arrangement, DateArranger, Series};
use crate::time::TimeLookup;
use serde::Serialize;
use tracing::{info, warn};

/// Issues raised while arranging one series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesIssues {
    pub series: String,
    pub issues: Vec<ArrangeIssue>,
}

/// Combined output of arranging every series
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArrangementPlan {
    pub arrangements: Vec<Arrangement>,
    pub issues: Vec<SeriesIssues>,
    /// Set when planning stopped at the first series with issues
    pub stopped_early: bool,
}

impl ArrangementPlan {
    pub fn issue_count(&self) -> usize {
        self.issues.iter().map(|s| s.issues.len()).sum()
    }

    pub fn has_issues(&self) -> bool {
        self.issue_count() > 0
    }
}

/// Runs a [`DateArranger`] over a list of series
pub struct ArrangementPlanner<'a, L: TimeLookup + ?Sized> {
    arranger: DateArranger,
    lookup: &'a L,
    stop_on_issues: bool,
}

impl<'a, L: TimeLookup + ?Sized> ArrangementPlanner<'a, L> {
    pub fn new(arranger: DateArranger, lookup: &'a L) -> Self {
        Self {
            arranger,
            lookup,
            stop_on_issues: false,
        }
    }

    /// Stop after the first series that reports issues
    pub fn stop_on_issues(mut self, stop: bool) -> Self {
        self.stop_on_issues = stop;
        self
    }

    pub fn plan(&self, series_list: &[Series]) -> ArrangementPlan {
        let mut plan = ArrangementPlan::default();
        let total = series_list.len();

        for (index, series) in series_list.iter().enumerate() {
            info!(
                series = %series.key(),
                progress = %format!("{}/{}", index + 1, total),
                "Planning series"
            );
            let result = self.arranger.arrange(series, self.lookup);
            plan.arrangements.extend(result.arrangement);

            if !result.issues.is_empty() {
                warn!(series = %series.key(), count = result.issues.len(), "Series has issues");
                plan.issues.push(SeriesIssues {
                    series: series.key(),
                    issues: result.issues,
                });
                if self.stop_on_issues {
                    plan.stopped_early = index + 1 < total;
                    break;
                }
            }
        }

        info!(
            arrangements = plan.arrangements.len(),
            issues = plan.issue_count(),
            "Arrangement plan ready"
        );
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcim::{ArrangeIssueKind, group_paths};
    use crate::time::{CaptureTime, LookupError, LookupErrorKind};
    use chrono::NaiveDate;
    use std::path::Path;

    fn lookup(path: &Path) -> Result<CaptureTime, LookupError> {
        if path.to_string_lossy().contains("BAD") {
            return Err(LookupError::new(LookupErrorKind::ReadFailed, "unreadable"));
        }
        let serial: u32 = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.get(4..))
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let time = NaiveDate::from_ymd_opt(2024, 8, 17)
            .unwrap()
            .and_hms_opt(10, 0, serial % 60)
            .unwrap();
        Ok(CaptureTime::at(time))
    }

    #[test]
    fn test_plan_collects_all_series() {
        let grouped = group_paths([
            "/card/DCIM/100NIKON/DSC_0001.JPG",
            "/card/DCIM/100NIKON/DSC_0002.JPG",
            "/card/DCIM/100CANON/IMG_0003.JPG",
        ]);
        let lookup = lookup;

        let plan = ArrangementPlanner::new(DateArranger::new("/pick"), &lookup).plan(&grouped.series_list);

        assert_eq!(plan.arrangements.len(), 3);
        assert!(!plan.has_issues());
        assert!(!plan.stopped_early);
        assert!(
            plan.arrangements
                .iter()
                .any(|a| a.target_path == Path::new("/pick/20240817-CANON-IMG_/IMG_0003.JPG"))
        );
    }

    #[test]
    fn test_plan_keeps_going_by_default() {
        let grouped = group_paths([
            "/card/DCIM/100BADCA/IMG_0001.JPG",
            "/card/DCIM/100NIKON/DSC_0002.JPG",
        ]);
        let lookup = lookup;

        let plan = ArrangementPlanner::new(DateArranger::new("/pick"), &lookup).plan(&grouped.series_list);

        assert_eq!(plan.arrangements.len(), 1);
        assert_eq!(plan.issue_count(), 1);
        assert_eq!(plan.issues[0].series, "BADCA-IMG_");
        assert_eq!(plan.issues[0].issues[0].kind, ArrangeIssueKind::ReadFailed);
    }

    #[test]
    fn test_plan_stops_on_issues() {
        let grouped = group_paths([
            "/card/DCIM/100BADCA/IMG_0001.JPG",
            "/card/DCIM/100NIKON/DSC_0002.JPG",
        ]);
        let lookup = lookup;

        let plan = ArrangementPlanner::new(DateArranger::new("/pick"), &lookup)
            .stop_on_issues(true)
            .plan(&grouped.series_list);

        assert!(plan.stopped_early);
        assert!(plan.arrangements.is_empty());
        assert_eq!(plan.issue_count(), 1);
    }
}
