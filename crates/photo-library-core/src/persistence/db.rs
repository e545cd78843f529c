use std::path::{Path, PathBuf};

use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::error::{map_create_error, PersistenceError, PersistenceResult};
use super::models::{
    metadata_from_column, metadata_to_column, timestamp_from_column, timestamp_to_column,
    IndexedRecord, LibraryRecord,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS indexed_records (
    id            INTEGER PRIMARY KEY,
    host          TEXT NOT NULL,
    path          TEXT NOT NULL,
    content_hash  TEXT,
    captured_at   TEXT,
    metadata      TEXT,
    is_missing    INTEGER NOT NULL DEFAULT 0,
    library_ref   TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_indexed_host_path
    ON indexed_records (host, path);
CREATE INDEX IF NOT EXISTS idx_indexed_library_ref
    ON indexed_records (library_ref);

CREATE TABLE IF NOT EXISTS library_records (
    content_hash  TEXT PRIMARY KEY,
    extension     TEXT NOT NULL,
    captured_at   TEXT,
    metadata      TEXT,
    relative_path TEXT NOT NULL,
    is_missing    INTEGER NOT NULL DEFAULT 0
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_library_relative_path
    ON library_records (relative_path);
";

/// The two record stores, backed by a single SQLite database.
///
/// Uniqueness of `(host, path)` and of `content_hash` / `relative_path` is
/// enforced by the store's unique indexes; conflicting creates surface as
/// [`PersistenceError::Duplicate`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if necessary) the record store at `path`.
    pub fn open(path: &Path) -> PersistenceResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    PersistenceError::Initialization(format!(
                        "cannot create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        info!("record store opened at {}", path.display());
        Ok(db)
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> PersistenceResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> PersistenceResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // -- IndexedRecord store --

    /// Insert a new indexed record, returning its row ID.
    ///
    /// A second sighting of the same `(host, path)` yields `Duplicate`.
    pub fn create_indexed(&self, record: &IndexedRecord) -> PersistenceResult<i64> {
        if !record.path.is_absolute() {
            return Err(PersistenceError::InvalidRecord(format!(
                "path must be absolute: {}",
                record.path.display()
            )));
        }
        self.conn
            .execute(
                "INSERT INTO indexed_records
                 (host, path, content_hash, captured_at, metadata, is_missing, library_ref)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.host,
                    path_to_column(&record.path),
                    record.content_hash,
                    timestamp_to_column(record.captured_at.as_ref()),
                    metadata_to_column(record.metadata.as_ref()),
                    record.is_missing,
                    record.library_ref,
                ],
            )
            .map_err(|e| map_create_error(e, &format!("{}:{}", record.host, record.path.display())))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Look up an indexed record by its unique `(host, path)` key.
    pub fn find_indexed(&self, host: &str, path: &Path) -> PersistenceResult<Option<IndexedRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, host, path, content_hash, captured_at, metadata, is_missing, library_ref
                 FROM indexed_records WHERE host = ?1 AND path = ?2",
                params![host, path_to_column(path)],
                indexed_from_row,
            )
            .optional()?;
        Ok(record)
    }

    /// Persist changes to an existing indexed record.
    pub fn update_indexed(&self, record: &IndexedRecord) -> PersistenceResult<()> {
        let id = record
            .id
            .ok_or_else(|| PersistenceError::NotFound(record.path.display().to_string()))?;
        let updated = self.conn.execute(
            "UPDATE indexed_records
             SET content_hash = ?1, captured_at = ?2, metadata = ?3,
                 is_missing = ?4, library_ref = ?5
             WHERE id = ?6",
            params![
                record.content_hash,
                timestamp_to_column(record.captured_at.as_ref()),
                metadata_to_column(record.metadata.as_ref()),
                record.is_missing,
                record.library_ref,
                id,
            ],
        )?;
        if updated == 0 {
            return Err(PersistenceError::NotFound(record.path.display().to_string()));
        }
        Ok(())
    }

    /// All indexed records.
    pub fn all_indexed(&self) -> PersistenceResult<Vec<IndexedRecord>> {
        self.query_indexed(
            "SELECT id, host, path, content_hash, captured_at, metadata, is_missing, library_ref
             FROM indexed_records",
            params![],
        )
    }

    /// Indexed records that have not been imported yet.
    pub fn unimported_indexed(&self) -> PersistenceResult<Vec<IndexedRecord>> {
        self.query_indexed(
            "SELECT id, host, path, content_hash, captured_at, metadata, is_missing, library_ref
             FROM indexed_records WHERE library_ref IS NULL",
            params![],
        )
    }

    /// Indexed records imported into the library record with `content_hash`.
    pub fn sources(&self, content_hash: &str) -> PersistenceResult<Vec<IndexedRecord>> {
        self.query_indexed(
            "SELECT id, host, path, content_hash, captured_at, metadata, is_missing, library_ref
             FROM indexed_records WHERE library_ref = ?1",
            params![content_hash],
        )
    }

    /// Number of indexed records.
    pub fn count_indexed(&self) -> PersistenceResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM indexed_records", [], |row| row.get(0))?;
        Ok(count)
    }

    fn query_indexed(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> PersistenceResult<Vec<IndexedRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, indexed_from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    // -- LibraryRecord store --

    /// Insert a new library record.
    ///
    /// A second record for the same content hash yields `Duplicate`.
    pub fn create_library(&self, record: &LibraryRecord) -> PersistenceResult<()> {
        self.conn
            .execute(
                "INSERT INTO library_records
                 (content_hash, extension, captured_at, metadata, relative_path, is_missing)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.content_hash,
                    record.extension,
                    timestamp_to_column(record.captured_at.as_ref()),
                    metadata_to_column(record.metadata.as_ref()),
                    record.relative_path,
                    record.is_missing,
                ],
            )
            .map_err(|e| map_create_error(e, &record.content_hash))?;
        Ok(())
    }

    /// Look up a library record by its content hash.
    pub fn find_library(&self, content_hash: &str) -> PersistenceResult<Option<LibraryRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT content_hash, extension, captured_at, metadata, relative_path, is_missing
                 FROM library_records WHERE content_hash = ?1",
                params![content_hash],
                library_from_row,
            )
            .optional()?;
        Ok(record)
    }

    /// Update the missing flag of a library record.
    ///
    /// Identity fields (hash, extension, relative path) never mutate after
    /// creation, so this is the only library update the store offers.
    pub fn set_library_missing(&self, content_hash: &str, missing: bool) -> PersistenceResult<()> {
        let updated = self.conn.execute(
            "UPDATE library_records SET is_missing = ?1 WHERE content_hash = ?2",
            params![missing, content_hash],
        )?;
        if updated == 0 {
            return Err(PersistenceError::NotFound(content_hash.to_string()));
        }
        Ok(())
    }

    /// All library records.
    pub fn all_library(&self) -> PersistenceResult<Vec<LibraryRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT content_hash, extension, captured_at, metadata, relative_path, is_missing
             FROM library_records",
        )?;
        let rows = stmt.query_map([], library_from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Number of library records.
    pub fn count_library(&self) -> PersistenceResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM library_records", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn path_to_column(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn indexed_from_row(row: &Row) -> rusqlite::Result<IndexedRecord> {
    Ok(IndexedRecord {
        id: Some(row.get(0)?),
        host: row.get(1)?,
        path: PathBuf::from(row.get::<_, String>(2)?),
        content_hash: row.get(3)?,
        captured_at: timestamp_from_column(row.get(4)?),
        metadata: metadata_from_column(row.get(5)?),
        is_missing: row.get(6)?,
        library_ref: row.get(7)?,
    })
}

fn library_from_row(row: &Row) -> rusqlite::Result<LibraryRecord> {
    Ok(LibraryRecord {
        content_hash: row.get(0)?,
        extension: row.get(1)?,
        captured_at: timestamp_from_column(row.get(2)?),
        metadata: metadata_from_column(row.get(3)?),
        relative_path: row.get(4)?,
        is_missing: row.get(5)?,
    })
}
