//! EXIF capture time lookup for images

use super::{CaptureTime, LookupError, LookupErrorKind, TimeLookup};
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use tracing::trace;

/// EXIF tags to try for date extraction, in priority order
const DATE_TAGS: &[Tag] = &[
    Tag::DateTimeOriginal,  // When the original image was taken
    Tag::DateTimeDigitized, // When the image was digitized
    Tag::DateTime,          // File modification date/time
];

/// Reads capture time from the file's EXIF block
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifTimeLookup;

impl TimeLookup for ExifTimeLookup {
    fn lookup(&self, path: &Path) -> Result<CaptureTime, LookupError> {
        read_capture_time(path)
    }
}

/// Read the capture time of a single file
pub fn read_capture_time(path: &Path) -> Result<CaptureTime, LookupError> {
    let file = File::open(path).map_err(|e| {
        let kind = if e.kind() == io::ErrorKind::NotFound {
            LookupErrorKind::FileNotFound
        } else {
            LookupErrorKind::ReadFailed
        };
        LookupError::new(kind, format!("Failed to open {}: {}", path.display(), e))
    })?;
    let mut reader = BufReader::new(file);

    let exif = Reader::new()
        .read_from_container(&mut reader)
        .map_err(|e| classify_exif_error(path, e))?;

    let mut last_raw = None;
    for tag in DATE_TAGS {
        if let Some(field) = exif.get_field(*tag, In::PRIMARY) {
            let raw = field.display_value().to_string();
            if let Some(datetime) = parse_exif_datetime(&raw) {
                trace!(?path, ?tag, "Found EXIF date");
                return Ok(CaptureTime::at(datetime));
            }
            last_raw = Some(raw);
        }
    }

    Ok(match last_raw {
        Some(raw) => CaptureTime::invalid(raw),
        None => CaptureTime::missing(),
    })
}

fn classify_exif_error(path: &Path, error: exif::Error) -> LookupError {
    let kind = match &error {
        exif::Error::NotFound(_) => LookupErrorKind::NoExifData,
        exif::Error::Io(_) => LookupErrorKind::ReadFailed,
        _ => LookupErrorKind::ParseFailed,
    };
    LookupError::new(
        kind,
        format!("Failed to read EXIF data from {}: {}", path.display(), error),
    )
}

/// Parse EXIF datetime string format: "YYYY:MM:DD HH:MM:SS"
fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    // EXIF format: "2024:01:15 14:30:00" or with quotes
    let s = s.trim().trim_matches('"');

    // Try standard EXIF format
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S") {
        return Some(dt);
    }

    // Try with subseconds
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S%.f") {
        return Some(dt);
    }

    // Alternative formats, including the one display_value() renders
    let formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];

    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    None
}
