mod db;
mod error;
mod models;

#[cfg(test)]
mod tests;

pub use db::Database;
pub use error::{PersistenceError, PersistenceResult};
pub use models::{IndexedRecord, LibraryRecord, MetadataMap};
