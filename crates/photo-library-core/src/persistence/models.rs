use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::library_path;

/// Key/value metadata extracted from a file (EXIF tags, flattened to strings)
pub type MetadataMap = BTreeMap<String, String>;

/// Identity of a file as discovered at a specific source location.
///
/// `(host, path)` is unique across all indexed records and `path` is always
/// absolute. The derived fields (`content_hash`, `captured_at`, `metadata`)
/// are computed once and cached; rebuild mode resets them first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedRecord {
    /// Row ID in the store, `None` until first persisted
    pub id: Option<i64>,

    /// Identifier of the machine where the file was discovered
    pub host: String,

    /// Absolute, host-scoped path of the original sighting
    pub path: PathBuf,

    /// BLAKE3 hex digest of the full file content, `None` until computed
    pub content_hash: Option<String>,

    /// Capture timestamp parsed from metadata, if any
    pub captured_at: Option<DateTime<FixedOffset>>,

    /// Extracted metadata; `None` until computed, empty when the file has
    /// no extractable metadata
    pub metadata: Option<MetadataMap>,

    /// Whether the source file was absent at the last presence check
    pub is_missing: bool,

    /// Content hash of the library record this sighting was imported into
    pub library_ref: Option<String>,
}

impl IndexedRecord {
    /// New record for a first sighting; derived fields start absent.
    pub fn new(host: &str, path: &Path) -> Self {
        Self {
            id: None,
            host: host.to_string(),
            path: path.to_path_buf(),
            content_hash: None,
            captured_at: None,
            metadata: None,
            is_missing: false,
            library_ref: None,
        }
    }

    /// Clear the derived fields so they are recomputed (rebuild mode).
    pub fn reset_derived_fields(&mut self) {
        self.content_hash = None;
        self.captured_at = None;
        self.metadata = None;
    }

    /// Re-check presence of the source file on disk.
    ///
    /// Returns true when the missing flag changed and needs persisting.
    pub fn check_is_missing(&mut self) -> bool {
        let missing = !self.path.exists();
        let changed = missing != self.is_missing;
        self.is_missing = missing;
        changed
    }

    /// `file://` URL of the original sighting.
    pub fn url(&self) -> String {
        format!("file://0.0.0.0{}", self.path.display())
    }
}

/// Canonical, deduplicated representation of a unique file content.
///
/// `content_hash` is the primary identity; `extension` and `relative_path`
/// never mutate after creation. The sources of a library record are the
/// indexed records whose `library_ref` equals its content hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryRecord {
    /// BLAKE3 hex digest, globally unique
    pub content_hash: String,

    /// Normalized extension (lower-cased, leading separator)
    pub extension: String,

    /// Capture timestamp copied from the first contributing indexed record
    pub captured_at: Option<DateTime<FixedOffset>>,

    /// Metadata copied from the first contributing indexed record
    pub metadata: Option<MetadataMap>,

    /// Library-root-relative path of the canonical file, unique and derived
    /// once from `(content_hash, captured_at, extension)`
    pub relative_path: String,

    /// Whether the canonical file was absent at the last presence check
    pub is_missing: bool,
}

impl LibraryRecord {
    /// New library record from the first indexed record contributing a hash.
    pub fn from_indexed(origin: &IndexedRecord, content_hash: String) -> Self {
        let extension = library_path::normalize_extension(&origin.path);
        let relative_path =
            library_path::compose(&content_hash, origin.captured_at.as_ref(), &extension);
        Self {
            content_hash,
            extension,
            captured_at: origin.captured_at,
            metadata: origin.metadata.clone(),
            relative_path,
            is_missing: false,
        }
    }

    /// Absolute path of the canonical file under `library_root`.
    pub fn absolute_path(&self, library_root: &Path) -> PathBuf {
        library_root.join(&self.relative_path)
    }
}

// Column conversion helpers shared by the store queries. Timestamps are kept
// as RFC 3339 text so the original fixed offset survives a round trip;
// metadata is kept as a JSON object.

pub(crate) fn timestamp_to_column(ts: Option<&DateTime<FixedOffset>>) -> Option<String> {
    ts.map(|t| t.to_rfc3339())
}

pub(crate) fn timestamp_from_column(raw: Option<String>) -> Option<DateTime<FixedOffset>> {
    raw.and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
}

pub(crate) fn metadata_to_column(metadata: Option<&MetadataMap>) -> Option<String> {
    metadata.and_then(|m| serde_json::to_string(m).ok())
}

pub(crate) fn metadata_from_column(raw: Option<String>) -> Option<MetadataMap> {
    raw.and_then(|v| serde_json::from_str(&v).ok())
}
