#[allow(clippy::module_inception)]
#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use chrono::DateTime;

    use super::super::db::Database;
    use super::super::error::PersistenceError;
    use super::super::models::{IndexedRecord, LibraryRecord, MetadataMap};

    fn sample_indexed(host: &str, path: &str) -> IndexedRecord {
        let mut record = IndexedRecord::new(host, Path::new(path));
        record.content_hash = Some("aabbcc".to_string());
        record.captured_at =
            Some(DateTime::parse_from_rfc3339("2020-01-02T10:00:00+00:00").unwrap());
        let mut metadata = MetadataMap::new();
        metadata.insert("DateTimeOriginal".to_string(), "2020:01:02 10:00:00".to_string());
        metadata.insert("Make".to_string(), "ACME".to_string());
        record.metadata = Some(metadata);
        record
    }

    #[test]
    fn test_create_and_find_indexed() {
        let db = Database::open_in_memory().unwrap();
        let record = sample_indexed("host-a", "/src/a.jpg");

        let id = db.create_indexed(&record).unwrap();
        assert!(id > 0);

        let found = db
            .find_indexed("host-a", Path::new("/src/a.jpg"))
            .unwrap()
            .unwrap();
        assert_eq!(found.id, Some(id));
        assert_eq!(found.host, "host-a");
        assert_eq!(found.path, PathBuf::from("/src/a.jpg"));
        assert_eq!(found.content_hash.as_deref(), Some("aabbcc"));
        assert_eq!(found.captured_at, record.captured_at);
        assert_eq!(found.metadata, record.metadata);
        assert!(!found.is_missing);
        assert_eq!(found.library_ref, None);
    }

    #[test]
    fn test_find_indexed_unknown_is_none() {
        let db = Database::open_in_memory().unwrap();
        let found = db.find_indexed("host-a", Path::new("/nope.jpg")).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_host_path_uniqueness() {
        let db = Database::open_in_memory().unwrap();
        let record = sample_indexed("host-a", "/src/a.jpg");
        db.create_indexed(&record).unwrap();

        // same (host, path) conflicts
        let result = db.create_indexed(&record);
        assert!(matches!(result, Err(PersistenceError::Duplicate(_))));

        // same path on another host is a distinct record
        let other_host = sample_indexed("host-b", "/src/a.jpg");
        db.create_indexed(&other_host).unwrap();
        assert_eq!(db.count_indexed().unwrap(), 2);
    }

    #[test]
    fn test_update_indexed() {
        let db = Database::open_in_memory().unwrap();
        let mut record = sample_indexed("host-a", "/src/a.jpg");
        record.id = Some(db.create_indexed(&record).unwrap());

        record.library_ref = Some("aabbcc".to_string());
        record.is_missing = true;
        db.update_indexed(&record).unwrap();

        let found = db
            .find_indexed("host-a", Path::new("/src/a.jpg"))
            .unwrap()
            .unwrap();
        assert_eq!(found.library_ref.as_deref(), Some("aabbcc"));
        assert!(found.is_missing);
    }

    #[test]
    fn test_update_indexed_without_id_fails() {
        let db = Database::open_in_memory().unwrap();
        let record = sample_indexed("host-a", "/src/a.jpg");
        let result = db.update_indexed(&record);
        assert!(matches!(result, Err(PersistenceError::NotFound(_))));
    }

    #[test]
    fn test_unimported_indexed_selection() {
        let db = Database::open_in_memory().unwrap();

        let mut imported = sample_indexed("host-a", "/src/a.jpg");
        imported.library_ref = Some("aabbcc".to_string());
        db.create_indexed(&imported).unwrap();

        let pending = sample_indexed("host-a", "/src/b.jpg");
        db.create_indexed(&pending).unwrap();

        let unimported = db.unimported_indexed().unwrap();
        assert_eq!(unimported.len(), 1);
        assert_eq!(unimported[0].path, PathBuf::from("/src/b.jpg"));
        assert_eq!(db.all_indexed().unwrap().len(), 2);
    }

    #[test]
    fn test_create_and_find_library() {
        let db = Database::open_in_memory().unwrap();
        let origin = sample_indexed("host-a", "/src/a.jpg");
        let record = LibraryRecord::from_indexed(&origin, "aabbcc".to_string());

        db.create_library(&record).unwrap();

        let found = db.find_library("aabbcc").unwrap().unwrap();
        assert_eq!(found.content_hash, "aabbcc");
        assert_eq!(found.extension, ".jpg");
        assert_eq!(found.captured_at, origin.captured_at);
        assert_eq!(found.metadata, origin.metadata);
        assert_eq!(
            found.relative_path,
            "2020/01/02/2020-01-02T10-00-00.aabbcc.jpg"
        );
        assert!(!found.is_missing);
    }

    #[test]
    fn test_content_hash_uniqueness() {
        let db = Database::open_in_memory().unwrap();
        let origin = sample_indexed("host-a", "/src/a.jpg");
        let record = LibraryRecord::from_indexed(&origin, "aabbcc".to_string());

        db.create_library(&record).unwrap();
        let result = db.create_library(&record);
        assert!(matches!(result, Err(PersistenceError::Duplicate(_))));
        assert_eq!(db.count_library().unwrap(), 1);
    }

    #[test]
    fn test_set_library_missing() {
        let db = Database::open_in_memory().unwrap();
        let origin = sample_indexed("host-a", "/src/a.jpg");
        let record = LibraryRecord::from_indexed(&origin, "aabbcc".to_string());
        db.create_library(&record).unwrap();

        db.set_library_missing("aabbcc", true).unwrap();
        assert!(db.find_library("aabbcc").unwrap().unwrap().is_missing);

        db.set_library_missing("aabbcc", false).unwrap();
        assert!(!db.find_library("aabbcc").unwrap().unwrap().is_missing);

        let result = db.set_library_missing("unknown", true);
        assert!(matches!(result, Err(PersistenceError::NotFound(_))));
    }

    #[test]
    fn test_sources_back_reference() {
        let db = Database::open_in_memory().unwrap();

        for path in ["/src/a.jpg", "/src/sub/b.jpg"] {
            let mut record = sample_indexed("host-a", path);
            record.library_ref = Some("aabbcc".to_string());
            db.create_indexed(&record).unwrap();
        }
        let unrelated = sample_indexed("host-a", "/src/c.jpg");
        db.create_indexed(&unrelated).unwrap();

        let sources = db.sources("aabbcc").unwrap();
        assert_eq!(sources.len(), 2);
        assert!(sources.iter().all(|r| r.library_ref.as_deref() == Some("aabbcc")));
    }

    #[test]
    fn test_relative_path_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let record = IndexedRecord::new("host-a", Path::new("relative/a.jpg"));
        let result = db.create_indexed(&record);
        assert!(matches!(result, Err(PersistenceError::InvalidRecord(_))));
    }

    #[test]
    fn test_indexed_record_url() {
        let record = IndexedRecord::new("host-a", Path::new("/src/a.jpg"));
        assert_eq!(record.url(), "file://0.0.0.0/src/a.jpg");
    }

    #[test]
    fn test_open_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("store").join("photo-library.db");

        let _db = Database::open(&db_path).unwrap();
        assert!(db_path.exists());
    }
}
