//! DCIM Arranger - reorganize camera card output into dated series folders
//!
//! This library provides:
//! - DCF path classification and series grouping
//! - Date arrangement with serial overflow detection
//! - EXIF capture time lookup behind a pluggable trait
//! - Card import into a staging folder
//! - RAW companion planning
//! - Plan reporting and execution

pub mod cli;
pub mod config;
pub mod dcim;
pub mod error;
pub mod execute;
pub mod import;
pub mod plan;
pub mod raw;
pub mod report;
pub mod scan;
pub mod time;

pub use cli::{Cli, Command};
pub use config::{Config, ConfigError};
pub use dcim::{
    ArrangeIssue, ArrangeIssueKind, ArrangeResult, Arrangement, DateArranger, GroupIssue,
    GroupIssueKind, GroupResult, Photo, Series, group_paths,
};
pub use error::{Error, Result};
pub use import::{ImportPlan, plan_import};
pub use plan::{ArrangementPlan, ArrangementPlanner};
pub use raw::{PlannedMove, RawPlan, plan_raw_companions};
pub use report::ReportWriter;
pub use scan::Scanner;
pub use time::{CaptureTime, ExifTimeLookup, LookupError, LookupErrorKind, TimeLookup};
