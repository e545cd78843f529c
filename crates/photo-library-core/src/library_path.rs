//! Canonical library path derivation.
//!
//! The relative path of a library record is a pure function of its content
//! hash, capture timestamp, and normalized extension. Recomputing it from the
//! same inputs always yields the same value.

use std::path::Path;

use chrono::{DateTime, FixedOffset};

/// Directory used when no capture timestamp could be derived.
pub const MISSING_TIMESTAMP_DIR: &str = "_missing_timestamp";

const DIRNAME_FORMAT: &str = "%Y/%m/%d";
const BASENAME_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// Derive the library-root-relative path for a unique content hash.
///
/// Files with a capture timestamp land under `YYYY/MM/DD/` with a fixed-width
/// timestamp prefix on the filename; files without one land under
/// [`MISSING_TIMESTAMP_DIR`] named by hash alone.
pub fn compose(
    content_hash: &str,
    captured_at: Option<&DateTime<FixedOffset>>,
    extension: &str,
) -> String {
    match captured_at {
        Some(ts) => format!(
            "{}/{}.{}{}",
            ts.format(DIRNAME_FORMAT),
            ts.format(BASENAME_TIMESTAMP_FORMAT),
            content_hash,
            extension
        ),
        None => format!("{}/{}{}", MISSING_TIMESTAMP_DIR, content_hash, extension),
    }
}

/// Normalized file extension: lower-cased, with leading separator.
///
/// Empty when the path has no extension.
pub fn normalize_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

// -- Tests --
