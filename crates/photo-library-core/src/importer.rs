//! The import pass: deduplicate indexed records by content hash and
//! materialize one canonical copy per unique file under the library root.

use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::error::{Error, Result};
use crate::persistence::{Database, IndexedRecord, LibraryRecord, PersistenceError};
use crate::progress::pass_progress;
use crate::types::BatchSummary;

/// Finds-or-creates a library record per unique content hash, links each
/// indexed record to it, and places the canonical file if absent.
pub struct Importer<'a> {
    db: &'a Database,
    library_root: &'a Path,
}

impl<'a> Importer<'a> {
    pub fn new(db: &'a Database, library_root: &'a Path) -> Self {
        Self { db, library_root }
    }

    /// Import every indexed record without a library link, or every record
    /// when `rebuild` is set.
    ///
    /// Record order does not affect the final state: identity is
    /// content-hash-based, and placement is write-once. Per-record failures
    /// (copy errors, store rejections) are counted and skipped so a later
    /// run can retry them.
    pub fn import_all(&self, rebuild: bool) -> Result<BatchSummary> {
        info!("[import] {} record(s) in library", self.db.count_library()?);
        if rebuild {
            info!("[import] rebuild library");
        }

        let records = if rebuild {
            self.db.all_indexed()?
        } else {
            self.db.unimported_indexed()?
        };
        info!("[import] {} record(s) to import", records.len());

        let mut summary = BatchSummary::default();
        let bar = pass_progress(records.len() as u64, "importing");
        for mut record in records {
            bar.inc(1);
            if let Err(err) = self.import_one(&mut record, &mut summary) {
                warn!("[import] skipping {}: {}", record.path.display(), err);
                summary.errors += 1;
            }
        }
        bar.finish();

        info!("[import] {} record(s) in library", self.db.count_library()?);
        Ok(summary)
    }

    fn import_one(&self, record: &mut IndexedRecord, summary: &mut BatchSummary) -> Result<()> {
        let Some(content_hash) = record.content_hash.clone() else {
            // source was unreadable at index time; only re-check presence
            self.refresh_source_presence(record, summary)?;
            return Ok(());
        };

        let library = self.find_or_create_library(record, &content_hash, summary)?;

        if record.library_ref.as_deref() != Some(library.content_hash.as_str()) {
            record.library_ref = Some(library.content_hash.clone());
            self.db.update_indexed(record)?;
            summary.records_imported += 1;
        }

        // write-once canonical copy
        if record.path.exists() {
            let target = library.absolute_path(self.library_root);
            if !target.exists() {
                self.place_file(&record.path, &target)?;
                summary.files_copied += 1;
            }
        }

        self.refresh_source_presence(record, summary)?;
        self.refresh_library_presence(&library, summary)?;
        Ok(())
    }

    /// Find the library record for `content_hash` or create it from `record`.
    ///
    /// When found, nothing on the existing record is overwritten; the caller
    /// only gains membership in its sources by linking `library_ref`. A
    /// duplicate-create conflict is resolved by re-reading.
    fn find_or_create_library(
        &self,
        record: &IndexedRecord,
        content_hash: &str,
        summary: &mut BatchSummary,
    ) -> Result<LibraryRecord> {
        if let Some(existing) = self.db.find_library(content_hash)? {
            return Ok(existing);
        }

        let library = LibraryRecord::from_indexed(record, content_hash.to_string());
        match self.db.create_library(&library) {
            Ok(()) => {
                summary.records_created += 1;
                Ok(library)
            }
            Err(PersistenceError::Duplicate(_)) => self
                .db
                .find_library(content_hash)?
                .ok_or_else(|| Error::Persistence(PersistenceError::NotFound(content_hash.to_string()))),
            Err(e) => Err(e.into()),
        }
    }

    fn place_file(&self, from: &Path, to: &Path) -> Result<()> {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(from, to)?;
        Ok(())
    }

    fn refresh_source_presence(
        &self,
        record: &mut IndexedRecord,
        summary: &mut BatchSummary,
    ) -> Result<()> {
        if record.check_is_missing() {
            self.db.update_indexed(record)?;
            summary.missing_flag_changes += 1;
        }
        Ok(())
    }

    fn refresh_library_presence(
        &self,
        library: &LibraryRecord,
        summary: &mut BatchSummary,
    ) -> Result<()> {
        let missing = !library.absolute_path(self.library_root).exists();
        if missing != library.is_missing {
            self.db.set_library_missing(&library.content_hash, missing)?;
            summary.missing_flag_changes += 1;
        }
        Ok(())
    }
}

// -- Tests --
