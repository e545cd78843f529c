//! Metadata extraction and capture-timestamp parsing.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use log::debug;

use crate::persistence::MetadataMap;

/// Metadata key holding the capture timestamp.
pub const CAPTURE_TIMESTAMP_KEY: &str = "DateTimeOriginal";

/// EXIF date-time values look like "2020:01:02 10:00:00".
const EXIF_TIMESTAMP_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Source of key/value metadata for a file.
///
/// Failure to read (corrupt or unsupported file) is "no metadata", never an
/// error; implementations return an empty map in that case.
pub trait MetadataSource: Send + Sync {
    fn read_metadata(&self, path: &Path) -> MetadataMap;
}

/// Reads EXIF tags from the primary image IFD into a flat string map.
#[derive(Debug, Default)]
pub struct ExifMetadataSource;

impl MetadataSource for ExifMetadataSource {
    fn read_metadata(&self, path: &Path) -> MetadataMap {
        match read_exif(path) {
            Ok(map) => map,
            Err(err) => {
                debug!("no metadata for {}: {}", path.display(), err);
                MetadataMap::new()
            }
        }
    }
}

fn read_exif(path: &Path) -> std::result::Result<MetadataMap, exif::Error> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let data = exif::Reader::new().read_from_container(&mut reader)?;

    let mut map = MetadataMap::new();
    for field in data.fields().filter(|f| f.ifd_num == exif::In::PRIMARY) {
        map.entry(field.tag.to_string())
            .or_insert_with(|| field.display_value().to_string());
    }
    Ok(map)
}

/// Parse the capture timestamp from extracted metadata, interpreted in the
/// configured fixed timezone.
///
/// An absent or unparsable value yields `None`, not an error.
pub fn parse_captured_at(
    metadata: &MetadataMap,
    time_zone: FixedOffset,
) -> Option<DateTime<FixedOffset>> {
    let raw = metadata.get(CAPTURE_TIMESTAMP_KEY)?;
    let raw = raw.trim().trim_matches('"');
    let naive = NaiveDateTime::parse_from_str(raw, EXIF_TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()?;
    time_zone.from_local_datetime(&naive).single()
}

// -- Tests --
