//! Shared helpers for tests.

use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::FixedOffset;

use crate::persistence::MetadataMap;
use crate::processing::{MetadataSource, CAPTURE_TIMESTAMP_KEY};

/// Metadata source returning the same fixed map for every path.
pub struct StubMetadataSource(pub MetadataMap);

impl MetadataSource for StubMetadataSource {
    fn read_metadata(&self, _path: &Path) -> MetadataMap {
        self.0.clone()
    }
}

/// Map holding only a capture timestamp entry.
pub fn capture_metadata(raw: &str) -> MetadataMap {
    let mut map = MetadataMap::new();
    map.insert(CAPTURE_TIMESTAMP_KEY.to_string(), raw.to_string());
    map
}

pub fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

/// Write a file under `root`, creating intermediate directories.
pub fn write_file(root: &Path, relative: &str, bytes: &[u8]) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut file = File::create(&path).unwrap();
    file.write_all(bytes).unwrap();
    path
}
