//! Core functionality for building a deduplicated, content-addressed photo
//! library from scanned source trees.
//!
//! Two passes cooperate:
//! - an indexing pass that discovers picture files and records their identity
//!   (content hash, capture timestamp, metadata) keyed by original location
//! - an import pass that deduplicates discovered files by content hash and
//!   materializes a single canonical copy per unique file under a
//!   date-organized library root
//!
//! A reconciliation pass, run in rebuild mode after import, keeps the
//! on-disk-presence flag of every library record accurate.

// -- External Dependencies --

use log::info;

// -- Internal Modules --
mod error;
mod progress;

// -- Public Re-exports --
pub use config::Config;
pub use error::{Error, Result};
pub use persistence::{Database, IndexedRecord, LibraryRecord, MetadataMap};
pub use types::BatchSummary;

// -- Public Modules --
pub mod config;
pub mod importer;
pub mod indexer;
pub mod library_path;
pub mod persistence;
pub mod processing;
pub mod reconciler;
pub mod types;

// -- Test Modules --
#[cfg(test)]
pub mod test_utils;

use importer::Importer;
use indexer::Indexer;
use processing::HashAndMetadataEngine;
use reconciler::Reconciler;

/// Main entry point for the indexing and import pipeline
pub struct PhotoLibrary {
    config: Config,
    db: Database,
    engine: HashAndMetadataEngine,
    host: String,
}

impl PhotoLibrary {
    /// Create a new PhotoLibrary with the provided configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let db = Database::open(&config.database_path)?;
        let engine = HashAndMetadataEngine::new(config.time_zone_offset()?);
        let host = config.host_id();
        Ok(Self {
            config,
            db,
            engine,
            host,
        })
    }

    /// Scan the configured source tree and upsert one record per match
    pub fn index(&self, rebuild: bool) -> Result<BatchSummary> {
        Indexer::new(&self.db, &self.engine, self.host.clone()).scan(
            &self.config.root_path,
            &self.config.file_extensions,
            rebuild,
        )
    }

    /// Deduplicate indexed records and place canonical files
    pub fn import(&self, rebuild: bool) -> Result<BatchSummary> {
        Importer::new(&self.db, &self.config.library_root).import_all(rebuild)
    }

    /// Re-verify on-disk presence of every library record
    pub fn reconcile(&self) -> Result<BatchSummary> {
        Reconciler::new(&self.db, &self.config.library_root).reconcile_missing()
    }

    /// Run the full pipeline: index, import, and (in rebuild mode) reconcile
    pub fn run(&self, rebuild: bool) -> Result<BatchSummary> {
        let mut summary = self.index(rebuild)?;
        summary.merge(&self.import(rebuild)?);
        if rebuild {
            summary.merge(&self.reconcile()?);
        }
        info!(
            "batch complete: {} matched, {} created, {} imported, {} copied, {} flag change(s), {} error(s)",
            summary.files_matched,
            summary.records_created,
            summary.records_imported,
            summary.files_copied,
            summary.missing_flag_changes,
            summary.errors
        );
        Ok(summary)
    }

    /// Record store handle, for inspection and tests
    pub fn database(&self) -> &Database {
        &self.db
    }
}

// -- Tests --
