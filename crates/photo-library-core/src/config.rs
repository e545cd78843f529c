use std::fs;
use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for the indexing and import pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory scanned for picture files
    pub root_path: PathBuf,

    /// File extensions considered for indexation, matched case-insensitively
    pub file_extensions: Vec<String>,

    /// Whether to reset and recompute derived fields and re-verify presence
    pub rebuild: bool,

    /// Fixed UTC offset used to interpret capture timestamps, e.g. "+00:00"
    pub time_zone: String,

    /// Destination directory for canonical library files
    pub library_root: PathBuf,

    /// Path to the record-store database file
    pub database_path: PathBuf,

    /// Host identifier override; defaults to the local hostname
    pub host: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("."),
            file_extensions: ["jpg", "jpeg", "png", "tif", "tiff", "heic"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            rebuild: false,
            time_zone: "+00:00".to_string(),
            library_root: PathBuf::from("library"),
            database_path: PathBuf::from("photo-library.db"),
            host: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| {
            Error::Configuration(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Save configuration to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Configuration(e.to_string()))?;
        fs::write(path, raw)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.file_extensions.is_empty() {
            return Err(Error::Configuration(
                "file_extensions must not be empty".to_string(),
            ));
        }
        self.time_zone_offset()?;
        Ok(())
    }

    /// Parsed fixed offset for capture-timestamp interpretation
    pub fn time_zone_offset(&self) -> Result<FixedOffset> {
        parse_fixed_offset(&self.time_zone).ok_or_else(|| {
            Error::Configuration(format!("invalid time zone offset: {}", self.time_zone))
        })
    }

    /// Host identifier used to scope indexed records
    pub fn host_id(&self) -> String {
        self.host
            .clone()
            .or_else(sysinfo::System::host_name)
            .unwrap_or_else(|| "localhost".to_string())
    }
}

/// Parse a fixed UTC offset written as "+HH:MM", "+HHMM", or "Z".
pub fn parse_fixed_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = if let Some(rest) = value.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = value.strip_prefix('-') {
        (-1, rest)
    } else {
        return None;
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

// -- Tests --

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_fixed_offset() {
        assert_eq!(parse_fixed_offset("+00:00"), FixedOffset::east_opt(0));
        assert_eq!(parse_fixed_offset("+0000"), FixedOffset::east_opt(0));
        assert_eq!(parse_fixed_offset("Z"), FixedOffset::east_opt(0));
        assert_eq!(parse_fixed_offset("+02:00"), FixedOffset::east_opt(7200));
        assert_eq!(parse_fixed_offset("-0530"), FixedOffset::west_opt(5 * 3600 + 1800));
        assert_eq!(parse_fixed_offset("0200"), None);
        assert_eq!(parse_fixed_offset("+2:00"), None);
        assert_eq!(parse_fixed_offset("+02:75"), None);
        assert_eq!(parse_fixed_offset(""), None);
    }

    #[test]
    fn test_validate_rejects_empty_extensions() {
        let config = Config {
            file_extensions: vec![],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_time_zone() {
        let config = Config {
            time_zone: "somewhere".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.time_zone = "+02:00".to_string();
        config.host = Some("camera-box".to_string());
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.time_zone, "+02:00");
        assert_eq!(loaded.host.as_deref(), Some("camera-box"));
        assert_eq!(loaded.file_extensions, config.file_extensions);
    }

    #[test]
    fn test_host_id_prefers_override() {
        let config = Config {
            host: Some("scanner-1".to_string()),
            ..Config::default()
        };
        assert_eq!(config.host_id(), "scanner-1");
    }
}
