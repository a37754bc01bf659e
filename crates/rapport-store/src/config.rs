//! Configuration for the SQLite adapter
//!
//! Loaded from TOML, either on its own or as the `[store]` table of a larger
//! configuration file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Store configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A field has an unusable value
    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Field name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// SQLite adapter configuration
///
/// # Examples
///
/// ```
/// use rapport_store::StoreConfig;
///
/// let config = StoreConfig::default();
/// assert_eq!(config.busy_timeout_ms, 5000);
/// assert!(config.wal);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file, or `:memory:` for a private in-memory database
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// How long a writer waits for another connection's transaction to finish
    /// Default: 5000 ms
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Use write-ahead logging so readers never wait on writers
    /// Default: true (ignored for in-memory databases)
    #[serde(default = "default_wal")]
    pub wal: bool,
}

fn default_path() -> PathBuf {
    PathBuf::from("rapport.db")
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_wal() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            wal: default_wal(),
        }
    }
}

impl StoreConfig {
    /// Configuration for a private in-memory database
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::from(":memory:"),
            wal: false,
            ..Self::default()
        }
    }

    /// Configuration for a database file with default settings
    pub fn at<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: StoreConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every field is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "path",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Whether this configuration points at an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == ":memory:"
    }

    /// Busy timeout as a duration
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.path, PathBuf::from("rapport.db"));
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_in_memory_config() {
        let config = StoreConfig::in_memory();
        assert!(config.is_in_memory());
        assert!(!config.wal);
    }

    #[test]
    fn test_parse_toml_with_defaults() {
        let config: StoreConfig = toml::from_str(r#"path = "/var/lib/rapport/social.db""#).unwrap();
        assert_eq!(config.path, PathBuf::from("/var/lib/rapport/social.db"));
        assert_eq!(config.busy_timeout_ms, 5000);
        assert!(config.wal);
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "path = \"game.db\"").unwrap();
        writeln!(file, "busy_timeout_ms = 250").unwrap();
        writeln!(file, "wal = false").unwrap();

        let config = StoreConfig::from_file(file.path()).unwrap();
        assert_eq!(config.path, PathBuf::from("game.db"));
        assert_eq!(config.busy_timeout_ms, 250);
        assert!(!config.wal);
    }

    #[test]
    fn test_empty_path_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "path = \"\"").unwrap();
        assert!(matches!(
            StoreConfig::from_file(file.path()),
            Err(ConfigError::Invalid { field: "path", .. })
        ));
    }
}
