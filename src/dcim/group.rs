//! Series grouping
//!
//! A series is every photo sharing a directory suffix and a file prefix,
//! across all numbered folders of a card. For example:
//! - `100NIKON/DSC_0001.JPG` and `101NIKON/DSC_0002.JPG` share series `NIKON-DSC_`
//! - `100NIKON/DSZ_0001.JPG` starts a separate series `NIKON-DSZ_`

use super::classify::classify_path;
use super::photo::{GroupIssue, Photo};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Photos from one camera identity and one naming prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub directory_suffix: String,
    pub prefix: String,
    /// True when every contributing folder follows the DCF `NNNAAAAA` rule
    pub matches_dcf_directory: bool,
    /// Sorted by directory serial, then file serial
    pub photos: Vec<Photo>,
}

impl Series {
    /// Human readable key, e.g. `NIKON-DSC_`
    pub fn key(&self) -> String {
        format!("{}-{}", self.directory_suffix, self.prefix)
    }

    fn sort_photos(&mut self) {
        self.photos.sort_by(|a, b| {
            a.directory_serial
                .cmp(&b.directory_serial)
                .then(a.file_serial.cmp(&b.file_serial))
                .then_with(|| a.extension.cmp(&b.extension))
                .then_with(|| a.full_path.cmp(&b.full_path))
        });
    }
}

/// Output of [`group_paths`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupResult {
    /// Series in the order their key was first seen
    pub series_list: Vec<Series>,
    pub issues: Vec<GroupIssue>,
}

/// Partition file paths into series.
///
/// Paths that do not classify are recorded as issues and left out; they never
/// stop the remaining paths from being grouped.
pub fn group_paths<I, P>(paths: I) -> GroupResult
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut result = GroupResult::default();

    for path in paths {
        let path = path.as_ref();
        let (photo, is_dcf) = match classify_path(path) {
            Ok(classified) => classified,
            Err(issue) => {
                debug!(?path, kind = %issue.kind, "Rejected path during grouping");
                result.issues.push(issue);
                continue;
            }
        };

        let key = (photo.directory_suffix.clone(), photo.prefix.clone());
        let slot = *index.entry(key).or_insert_with(|| {
            result.series_list.push(Series {
                directory_suffix: photo.directory_suffix.clone(),
                prefix: photo.prefix.clone(),
                matches_dcf_directory: true,
                photos: Vec::new(),
            });
            result.series_list.len() - 1
        });

        let series = &mut result.series_list[slot];
        series.matches_dcf_directory &= is_dcf;
        series.photos.push(photo);
    }

    for series in &mut result.series_list {
        series.sort_photos();
    }

    debug!(
        series = result.series_list.len(),
        issues = result.issues.len(),
        "Grouped paths into series"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcim::GroupIssueKind;

    fn find<'a>(result: &'a GroupResult, suffix: &str, prefix: &str) -> &'a Series {
        result
            .series_list
            .iter()
            .find(|s| s.directory_suffix == suffix && s.prefix == prefix)
            .unwrap_or_else(|| panic!("series {suffix}-{prefix} not found"))
    }

    #[test]
    fn test_group_and_sort() {
        let result = group_paths([
            "/media/Z63/DCIM/100NIKON/DSC_0002.JPG",
            "/media/Z63/DCIM/100NIKON/DSC_0001.JPG",
            "/media/Z63/DCIM/101NIKON/DSC_0003.JPG",
            "/media/Z63/DCIM/100NIKON/DSZ_0001.JPG",
        ]);

        assert!(result.issues.is_empty());
        assert_eq!(result.series_list.len(), 2);

        let dsc = find(&result, "NIKON", "DSC_");
        let serials: Vec<u32> = dsc.photos.iter().map(|p| p.file_serial).collect();
        assert_eq!(serials, vec![1, 2, 3]);
        assert_eq!(find(&result, "NIKON", "DSZ_").photos.len(), 1);
    }

    #[test]
    fn test_non_dcf_directory_forms_own_series() {
        let result = group_paths([
            "/card/DCIM/RAW_IMAGES/DSC_0001.JPG",
            "/card/DCIM/RAW_IMAGES/DSC_0002.JPG",
        ]);

        assert_eq!(result.series_list.len(), 1);
        let series = &result.series_list[0];
        assert!(!series.matches_dcf_directory);
        assert_eq!(series.directory_suffix, "RAW_IMAGES");
        assert!(series.photos.iter().all(|p| p.directory_serial == 0));
    }

    #[test]
    fn test_invalid_names_become_issues() {
        let result = group_paths([
            "/media/Z63/DCIM/100NIKON/DSC_0001.JPG",
            "/media/Z63/DCIM/100NIKON/BROKEN.JPG",
            "/media/Z63/DCIM/100NIKON/DSC_0002.JPG",
        ]);

        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].kind, GroupIssueKind::InvalidFileSerial);
        assert_eq!(result.series_list.len(), 1);

        let names: Vec<&str> = result.series_list[0]
            .photos
            .iter()
            .map(|p| p.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["DSC_0001.JPG", "DSC_0002.JPG"]);
    }

    #[test]
    fn test_files_at_root_group_without_directory() {
        let result = group_paths(["/DSC_0001.JPG", "/BROKEN.JPG"]);

        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].kind, GroupIssueKind::InvalidFileSerial);
        assert_eq!(result.issues[0].file_path.as_path(), Path::new("/BROKEN.JPG"));

        assert_eq!(result.series_list.len(), 1);
        let series = &result.series_list[0];
        assert_eq!(series.directory_suffix, "");
        assert_eq!(series.prefix, "DSC_");
        assert!(!series.matches_dcf_directory);
    }

    #[test]
    fn test_numbered_folders_merge() {
        let result = group_paths([
            "/card/DCIM/100NIKON/DSC_0001.JPG",
            "/card/DCIM/101NIKON/DSC_0002.JPG",
            "/card/DCIM/102NIKON/DSC_0003.JPG",
        ]);

        assert_eq!(result.series_list.len(), 1);
        let series = &result.series_list[0];
        assert_eq!(series.key(), "NIKON-DSC_");
        assert!(series.matches_dcf_directory);

        let dirs: Vec<u32> = series.photos.iter().map(|p| p.directory_serial).collect();
        assert_eq!(dirs, vec![100, 101, 102]);
    }

    #[test]
    fn test_prefixes_split_series() {
        let result = group_paths([
            "/card/DCIM/100NIKON/DSC_0001.JPG",
            "/card/DCIM/100NIKON/DSZ_0001.JPG",
            "/card/DCIM/101NIKON/DSC_0002.JPG",
        ]);

        let mut prefixes: Vec<&str> = result.series_list.iter().map(|s| s.prefix.as_str()).collect();
        prefixes.sort();
        assert_eq!(prefixes, vec!["DSC_", "DSZ_"]);
    }

    #[test]
    fn test_directory_serial_sorts_before_file_serial() {
        let result = group_paths([
            "/card/DCIM/101NIKON/DSC_0001.JPG",
            "/card/DCIM/100NIKON/DSC_9999.JPG",
        ]);

        let order: Vec<(u32, u32)> = result.series_list[0]
            .photos
            .iter()
            .map(|p| (p.directory_serial, p.file_serial))
            .collect();
        assert_eq!(order, vec![(100, 9999), (101, 1)]);
    }

    #[test]
    fn test_input_order_does_not_change_content() {
        let paths = [
            "/card/DCIM/100NIKON/DSC_0002.NEF",
            "/card/DCIM/100NIKON/DSC_0002.JPG",
            "/card/DCIM/101NIKON/DSZ_0007.JPG",
            "/card/DCIM/100NIKON/nope.txt",
            "/card/misc/IMG_0001.JPG",
        ];
        let mut reversed = paths;
        reversed.reverse();

        let forward = group_paths(paths);
        let backward = group_paths(reversed);

        let mut a = forward.series_list.clone();
        let mut b = backward.series_list.clone();
        a.sort_by_key(|s| s.key());
        b.sort_by_key(|s| s.key());
        assert_eq!(a, b);
        assert_eq!(forward.issues, backward.issues);
    }
}
