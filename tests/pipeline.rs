use chrono::{NaiveDate, NaiveDateTime};
use dcim_arranger::execute::{execute_copies, execute_deletes, execute_moves};
use dcim_arranger::{
    ArrangementPlanner, CaptureTime, DateArranger, LookupError, LookupErrorKind, PlannedMove,
    Scanner, group_paths, plan_import, plan_raw_companions,
};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 8, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, path.to_string_lossy().as_bytes()).unwrap();
}

#[test]
fn dcim_card_is_arranged_into_dated_series_folders() {
    let card = TempDir::new().unwrap();
    let pick = TempDir::new().unwrap();
    let dcim = card.path().join("DCIM");

    let mut times = HashMap::new();
    for (dir, name, time) in [
        ("100NIKON", "DSC_9999.JPG", at(17, 10, 0)),
        ("101NIKON", "DSC_0001.JPG", at(17, 10, 5)),
        ("101NIKON", "DSC_0002.JPG", at(18, 9, 0)),
    ] {
        let path = dcim.join(dir).join(name);
        touch(&path);
        times.insert(path, time);
    }
    touch(&dcim.join("100NIKON").join("notes.txt"));

    let lookup = |path: &Path| -> Result<CaptureTime, LookupError> {
        times
            .get(path)
            .map(|t| CaptureTime::at(*t))
            .ok_or_else(|| LookupError::new(LookupErrorKind::FileNotFound, "unknown"))
    };

    let paths = Scanner::new(["jpg"]).scan(&dcim).unwrap();
    assert_eq!(paths.len(), 3);

    let grouped = group_paths(&paths);
    assert!(grouped.issues.is_empty());
    assert_eq!(grouped.series_list.len(), 1);

    let plan = ArrangementPlanner::new(DateArranger::new(pick.path()), &lookup)
        .stop_on_issues(true)
        .plan(&grouped.series_list);
    assert!(!plan.has_issues());
    assert_eq!(plan.arrangements.len(), 3);

    let moves: Vec<PlannedMove> = plan.arrangements.iter().map(PlannedMove::from).collect();
    let summary = execute_moves(&moves, false).unwrap();
    assert_eq!(summary.moved, 3);

    let first_day = pick.path().join("20240817-NIKON-DSC_");
    assert!(first_day.join("DSC_09999.JPG").is_file());
    assert!(first_day.join("DSC_10001.JPG").is_file());
    assert!(pick.path().join("20240818-NIKON-DSC_").join("DSC_0002.JPG").is_file());
    assert!(!dcim.join("100NIKON").join("DSC_9999.JPG").exists());
    assert!(dcim.join("100NIKON").join("notes.txt").exists());
}

#[test]
fn dry_run_leaves_card_untouched() {
    let card = TempDir::new().unwrap();
    let pick = TempDir::new().unwrap();
    let origin = card.path().join("DCIM/100CANON/IMG_0042.JPG");
    touch(&origin);

    let lookup = |_: &Path| -> Result<CaptureTime, LookupError> { Ok(CaptureTime::at(at(20, 8, 0))) };
    let grouped = group_paths([&origin]);
    let plan = ArrangementPlanner::new(DateArranger::new(pick.path()), &lookup).plan(&grouped.series_list);

    let moves: Vec<PlannedMove> = plan.arrangements.iter().map(PlannedMove::from).collect();
    let summary = execute_moves(&moves, true).unwrap();

    assert_eq!(summary.planned, 1);
    assert_eq!(summary.moved, 0);
    assert!(origin.exists());
    assert!(fs::read_dir(pick.path()).unwrap().next().is_none());
}

#[test]
fn existing_target_is_never_overwritten() {
    let card = TempDir::new().unwrap();
    let pick = TempDir::new().unwrap();
    let origin = card.path().join("DCIM/100CANON/IMG_0042.JPG");
    touch(&origin);
    let occupied = pick.path().join("20240820-CANON-IMG_/IMG_0042.JPG");
    fs::create_dir_all(occupied.parent().unwrap()).unwrap();
    fs::write(&occupied, b"keep me").unwrap();

    let lookup = |_: &Path| -> Result<CaptureTime, LookupError> { Ok(CaptureTime::at(at(20, 8, 0))) };
    let grouped = group_paths([&origin]);
    let plan = ArrangementPlanner::new(DateArranger::new(pick.path()), &lookup).plan(&grouped.series_list);
    let moves: Vec<PlannedMove> = plan.arrangements.iter().map(PlannedMove::from).collect();

    assert!(execute_moves(&moves, false).is_err());
    assert_eq!(fs::read(&occupied).unwrap(), b"keep me");
    assert!(origin.exists());
}

#[test]
fn raw_cleanup_moves_pairs_and_deletes_orphans() {
    let pick = TempDir::new().unwrap();
    let folder = pick.path().join("20240817-NIKON-DSC_");
    let kept_jpg = folder.join("DSC_0001.JPG");
    let paired = folder.join("DSC_0001.NEF");
    let orphan = folder.join("DSC_0002.NEF");
    for path in [&kept_jpg, &paired, &orphan] {
        touch(path);
    }

    let paths: Vec<PathBuf> = Scanner::new(["jpg", "nef"]).scan(pick.path()).unwrap();
    let plan = plan_raw_companions(&paths, &["nef"]);
    assert_eq!(plan.moves.len(), 1);
    assert_eq!(plan.deletes, vec![orphan.clone()]);

    let moved = execute_moves(&plan.moves, false).unwrap();
    let deleted = execute_deletes(&plan.deletes, false).unwrap();

    assert_eq!(moved.moved, 1);
    assert_eq!(deleted.deleted, 1);
    assert!(folder.join("raw").join("DSC_0001.NEF").is_file());
    assert!(kept_jpg.is_file());
    assert!(!paired.exists());
    assert!(!orphan.exists());

    // A second pass finds nothing left to do
    let paths = Scanner::new(["jpg", "nef"]).scan(pick.path()).unwrap();
    assert!(plan_raw_companions(&paths, &["nef"]).is_empty());
}

#[test]
fn imported_card_arranges_from_import_folder() {
    let card = TempDir::new().unwrap();
    let import = TempDir::new().unwrap();
    let pick = TempDir::new().unwrap();
    touch(&card.path().join("DCIM/100CANON/IMG_0001.JPG"));
    touch(&card.path().join("DCIM/100CANON/IMG_0002.JPG"));
    touch(&card.path().join("DCIM/.Trashes/IMG_0003.JPG"));

    let plan = plan_import(card.path(), import.path()).unwrap();
    let copied = execute_copies(&plan.copies, false).unwrap();
    assert_eq!(copied.copied, 2);
    assert!(card.path().join("DCIM/100CANON/IMG_0001.JPG").exists());

    let paths = Scanner::new(["jpg"]).scan(import.path()).unwrap();
    let grouped = group_paths(&paths);
    assert_eq!(grouped.series_list.len(), 1);
    assert!(grouped.series_list[0].matches_dcf_directory);

    let lookup = |_: &Path| -> Result<CaptureTime, LookupError> { Ok(CaptureTime::at(at(21, 7, 30))) };
    let arranged = ArrangementPlanner::new(DateArranger::new(pick.path()), &lookup).plan(&grouped.series_list);
    let moves: Vec<PlannedMove> = arranged.arrangements.iter().map(PlannedMove::from).collect();
    execute_moves(&moves, false).unwrap();

    let folder = pick.path().join("20240821-CANON-IMG_");
    assert!(folder.join("IMG_0001.JPG").is_file());
    assert!(folder.join("IMG_0002.JPG").is_file());
}
