//! The indexing pass: walk a source tree and record the identity of every
//! matching picture file, keyed by `(host, path)`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{info, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::persistence::{Database, IndexedRecord, PersistenceError};
use crate::processing::HashAndMetadataEngine;
use crate::progress::pass_progress;
use crate::types::BatchSummary;

/// Walks a source tree and upserts one indexed record per matching file.
pub struct Indexer<'a> {
    db: &'a Database,
    engine: &'a HashAndMetadataEngine,
    host: String,
}

impl<'a> Indexer<'a> {
    pub fn new(db: &'a Database, engine: &'a HashAndMetadataEngine, host: String) -> Self {
        Self { db, engine, host }
    }

    /// Scan `root` recursively for files whose extension matches
    /// `extensions` (case-insensitively) and record each match.
    ///
    /// Previously seen files are left untouched unless `rebuild` is set, in
    /// which case their derived fields are reset and recomputed. Per-record
    /// errors are counted and skipped; they never abort the scan.
    pub fn scan(&self, root: &Path, extensions: &[String], rebuild: bool) -> Result<BatchSummary> {
        let root = root
            .canonicalize()
            .map_err(|_| Error::FileNotFound(root.to_path_buf()))?;
        info!(
            "[scan] at [{}], {} record(s) indexed",
            root.display(),
            self.db.count_indexed()?
        );
        if rebuild {
            info!("[scan] rebuild index");
        }

        let wanted = normalized_extensions(extensions);
        let matches: Vec<PathBuf> = WalkDir::new(&root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| matches_extension(p, &wanted))
            .collect();
        info!("[scan] {} matches to process", matches.len());

        let mut summary = BatchSummary {
            files_matched: matches.len(),
            ..Default::default()
        };

        let bar = pass_progress(matches.len() as u64, "indexing");
        for path in &matches {
            bar.inc(1);
            if let Err(err) = self.scan_one(path, rebuild, &mut summary) {
                warn!("[scan] skipping {}: {}", path.display(), err);
                summary.errors += 1;
            }
        }
        bar.finish();

        info!("[scan] {} record(s) indexed", self.db.count_indexed()?);
        Ok(summary)
    }

    fn scan_one(&self, path: &Path, rebuild: bool, summary: &mut BatchSummary) -> Result<()> {
        match self.db.find_indexed(&self.host, path)? {
            // idempotent no-op for previously seen files
            Some(_) if !rebuild => Ok(()),
            Some(mut record) => {
                record.reset_derived_fields();
                self.derive(&mut record)?;
                self.db.update_indexed(&record)?;
                Ok(())
            }
            None => {
                let mut record = IndexedRecord::new(&self.host, path);
                self.derive(&mut record)?;
                match self.db.create_indexed(&record) {
                    Ok(_) => {
                        summary.records_created += 1;
                        Ok(())
                    }
                    // another writer created it first; treat as found
                    Err(PersistenceError::Duplicate(_)) => {
                        if rebuild {
                            if let Some(mut existing) = self.db.find_indexed(&self.host, path)? {
                                existing.reset_derived_fields();
                                self.derive(&mut existing)?;
                                self.db.update_indexed(&existing)?;
                            }
                        }
                        Ok(())
                    }
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    fn derive(&self, record: &mut IndexedRecord) -> Result<()> {
        let present = self.engine.fill_derived_fields(record)?;
        record.is_missing = !present;
        Ok(())
    }
}

fn normalized_extensions(extensions: &[String]) -> HashSet<String> {
    extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_lowercase())
        .collect()
}

fn matches_extension(path: &Path, wanted: &HashSet<String>) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| wanted.contains(&e.to_lowercase()))
        .unwrap_or(false)
}

// -- Tests --
