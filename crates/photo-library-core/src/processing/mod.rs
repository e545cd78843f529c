mod hash;
mod metadata;

pub use hash::compute_content_hash;
pub use metadata::{
    parse_captured_at, ExifMetadataSource, MetadataSource, CAPTURE_TIMESTAMP_KEY,
};

use chrono::FixedOffset;

use crate::error::{Error, Result};
use crate::persistence::IndexedRecord;

/// Derives the identity fields of a record from the file bytes at its path:
/// content hash, capture timestamp, and raw metadata.
///
/// The engine holds no persistent state; its output is a pure function of
/// the file bytes and the metadata source.
pub struct HashAndMetadataEngine {
    metadata_source: Box<dyn MetadataSource>,
    time_zone: FixedOffset,
}

impl HashAndMetadataEngine {
    /// Engine reading EXIF metadata, timestamps interpreted in `time_zone`.
    pub fn new(time_zone: FixedOffset) -> Self {
        Self::with_source(Box::new(ExifMetadataSource), time_zone)
    }

    /// Engine with a custom metadata source. Tests inject fixtures here.
    pub fn with_source(metadata_source: Box<dyn MetadataSource>, time_zone: FixedOffset) -> Self {
        Self {
            metadata_source,
            time_zone,
        }
    }

    /// Fill the derived fields that are still absent on `record`.
    ///
    /// Fields already set are authoritative and are left untouched; callers
    /// reset them first to force recomputation. Returns `Ok(false)` with the
    /// record unchanged when the file does not exist, a normal outcome for
    /// stale index entries.
    pub fn fill_derived_fields(&self, record: &mut IndexedRecord) -> Result<bool> {
        if !record.path.exists() {
            return Ok(false);
        }

        if record.content_hash.is_none() {
            match hash::compute_content_hash(&record.path) {
                Ok(h) => record.content_hash = Some(h.to_hex().to_string()),
                // vanished between the existence check and the read
                Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Ok(false)
                }
                Err(e) => return Err(e),
            }
        }

        if record.metadata.is_none() {
            record.metadata = Some(self.metadata_source.read_metadata(&record.path));
        }

        if record.captured_at.is_none() {
            record.captured_at = record
                .metadata
                .as_ref()
                .and_then(|m| metadata::parse_captured_at(m, self.time_zone));
        }

        Ok(true)
    }
}

// -- Tests --
