//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use rapport_store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database settings
    #[serde(default = "default_store")]
    pub store: StoreConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Log filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Directory holding the configuration file and the default database.
    pub fn home() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".rapport"))
    }

    /// Get the configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.toml"))
    }

    /// Load configuration from the default path, writing the defaults there
    /// on first run.
    pub fn load_or_init() -> Result<Self> {
        Self::load_or_init_at(&Self::path()?)
    }

    /// Load configuration from `path`, or save and return the defaults if the
    /// file does not exist yet.
    pub fn load_or_init_at(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load_from(path);
        }

        let config = Self::default();
        config.save_to(path)?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.store.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: default_store(),
            settings: Settings::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            log_level: default_log_level(),
        }
    }
}

/// `~/.rapport/rapport.db`, or `rapport.db` in the working directory when
/// there is no home directory.
fn default_store() -> StoreConfig {
    match Config::home() {
        Ok(home) => StoreConfig::at(home.join("rapport.db")),
        Err(_) => StoreConfig::default(),
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert_eq!(config.settings.log_level, "warn");
        assert!(config.store.path.ends_with("rapport.db"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[store]
path = "game.db"
busy_timeout_ms = 250

[settings]
format = "json"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.store.path, PathBuf::from("game.db"));
        assert_eq!(config.store.busy_timeout_ms, 250);
        assert!(config.store.wal);
        assert_eq!(config.settings.format, OutputFormat::Json);
        assert!(config.settings.color);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.settings.color = false;
        config.store = StoreConfig::at(dir.path().join("x.db"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(!loaded.settings.color);
        assert_eq!(loaded.store, config.store);
    }

    #[test]
    fn test_first_run_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".rapport").join("config.toml");

        let config = Config::load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.settings.format, OutputFormat::Table);

        // Later runs read the file instead of overwriting it
        fs::write(&path, "[settings]\nformat = \"quiet\"\n").unwrap();
        let config = Config::load_or_init_at(&path).unwrap();
        assert_eq!(config.settings.format, OutputFormat::Quiet);
        assert!(config.settings.color);
    }

    #[test]
    fn test_invalid_store_path_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[store]\npath = \"\"\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(CliError::StoreConfig(_))));
    }
}
