//! DCIM series grouping and date arrangement
//!
//! Raw paths flow through [`group_paths`] into [`Series`], and each series
//! through [`DateArranger::arrange`] into [`Arrangement`]s. Neither step
//! touches the filesystem.

pub mod arrange;
pub mod classify;
pub mod group;
pub mod photo;

pub use arrange::{ArrangeIssue, ArrangeIssueKind, ArrangeResult, Arrangement, DateArranger};
pub use classify::{classify_directory, classify_file_name, classify_path};
pub use group::{GroupResult, Series, group_paths};
pub use photo::{GroupIssue, GroupIssueKind, Photo};
