//! The reconciliation pass: re-verify on-disk presence of every canonical
//! library file and update the missing flags. Invoked as part of a full
//! rebuild cycle, after import completes.

use std::path::Path;

use log::{info, warn};

use crate::error::Result;
use crate::persistence::Database;
use crate::progress::pass_progress;
use crate::types::BatchSummary;

pub struct Reconciler<'a> {
    db: &'a Database,
    library_root: &'a Path,
}

impl<'a> Reconciler<'a> {
    pub fn new(db: &'a Database, library_root: &'a Path) -> Self {
        Self { db, library_root }
    }

    /// Recompute the missing flag of every library record from canonical-file
    /// presence, persisting only the records whose flag changed.
    pub fn reconcile_missing(&self) -> Result<BatchSummary> {
        let records = self.db.all_library()?;
        info!("[reconcile] {} record(s) to check", records.len());

        let mut summary = BatchSummary::default();
        let bar = pass_progress(records.len() as u64, "reconciling");
        for record in records {
            bar.inc(1);
            let missing = !record.absolute_path(self.library_root).exists();
            if missing == record.is_missing {
                continue;
            }
            match self.db.set_library_missing(&record.content_hash, missing) {
                Ok(()) => summary.missing_flag_changes += 1,
                Err(err) => {
                    warn!("[reconcile] skipping {}: {}", record.content_hash, err);
                    summary.errors += 1;
                }
            }
        }
        bar.finish();

        info!(
            "[reconcile] {} missing-flag change(s)",
            summary.missing_flag_changes
        );
        Ok(summary)
    }
}

// -- Tests --

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{IndexedRecord, LibraryRecord};
    use crate::test_utils::write_file;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn library_record(db: &Database, hash: &str) -> LibraryRecord {
        let mut origin = IndexedRecord::new("test-host", &PathBuf::from("/src/a.jpg"));
        origin.content_hash = Some(hash.to_string());
        let record = LibraryRecord::from_indexed(&origin, hash.to_string());
        db.create_library(&record).unwrap();
        record
    }

    #[test]
    fn test_missing_file_convergence() {
        let db = Database::open_in_memory().unwrap();
        let root = tempdir().unwrap();
        let record = library_record(&db, "aabbcc");
        let canonical = write_file(root.path(), &record.relative_path, b"payload");

        let reconciler = Reconciler::new(&db, root.path());

        // file present, flag already false: nothing to do
        let summary = reconciler.reconcile_missing().unwrap();
        assert_eq!(summary.missing_flag_changes, 0);

        // deleting the canonical file flips the flag
        std::fs::remove_file(&canonical).unwrap();
        let summary = reconciler.reconcile_missing().unwrap();
        assert_eq!(summary.missing_flag_changes, 1);
        assert!(db.find_library("aabbcc").unwrap().unwrap().is_missing);

        // restoring it flips the flag back
        write_file(root.path(), &record.relative_path, b"payload");
        let summary = reconciler.reconcile_missing().unwrap();
        assert_eq!(summary.missing_flag_changes, 1);
        assert!(!db.find_library("aabbcc").unwrap().unwrap().is_missing);
    }

    #[test]
    fn test_reconcile_empty_store() {
        let db = Database::open_in_memory().unwrap();
        let root = tempdir().unwrap();
        let summary = Reconciler::new(&db, root.path()).reconcile_missing().unwrap();
        assert_eq!(summary, BatchSummary::default());
    }
}
