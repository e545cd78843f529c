use rusqlite;

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Persistence-specific errors
#[derive(Debug)]
pub enum PersistenceError {
    /// SQLite errors
    Database(rusqlite::Error),

    /// Unique-index conflict on create
    Duplicate(String),

    /// Record not found errors
    NotFound(String),

    /// Record violates a schema invariant
    InvalidRecord(String),

    /// Errors during database initialization
    Initialization(String),
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(err: rusqlite::Error) -> Self {
        PersistenceError::Database(err)
    }
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Database(err) => write!(f, "Database error: {}", err),
            Self::Duplicate(msg) => write!(f, "Duplicate entry: {}", msg),
            Self::NotFound(msg) => write!(f, "Record not found: {}", msg),
            Self::InvalidRecord(msg) => write!(f, "Invalid record: {}", msg),
            Self::Initialization(msg) => write!(f, "Database initialization error: {}", msg),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(err) => Some(err),
            _ => None,
        }
    }
}

/// Map an insert failure, turning unique-constraint conflicts into
/// [`PersistenceError::Duplicate`] so callers can resolve them by re-reading.
pub(crate) fn map_create_error(err: rusqlite::Error, what: &str) -> PersistenceError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            PersistenceError::Duplicate(what.to_string())
        }
        _ => PersistenceError::Database(err),
    }
}
