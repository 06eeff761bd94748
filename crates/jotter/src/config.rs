//! Configuration management for jotter.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::DEFAULT_KEY;
use crate::surface::Mode;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "jotter";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "notes.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `JOTTER_`, sections split on `__`)
/// 2. TOML config file at `~/.config/jotter/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub store: StoreConfig,
    /// Note list display configuration.
    pub list: ListConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/jotter/notes.db`
    pub database_path: Option<PathBuf>,
    /// Key the note list is stored under. Separate keys are separate lists.
    pub key: String,
}

/// Display-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Whether the list offers create, edit and delete.
    pub mode: Mode,
    /// Re-render on a fixed timer to follow changes made elsewhere.
    pub auto_refresh: bool,
    /// Period of the refresh timer in milliseconds.
    pub refresh_interval_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            key: DEFAULT_KEY.to_string(),
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Editable,
            auto_refresh: false,
            refresh_interval_ms: 2000,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("JOTTER_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.store.key.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "store key must not be empty".to_string(),
            });
        }

        if self.list.refresh_interval_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "refresh_interval_ms must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.store
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the refresh period as a Duration.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.list.refresh_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.store.key, "notes");
        assert_eq!(config.list.mode, Mode::Editable);
        assert!(!config.list.auto_refresh);
        assert_eq!(config.list.refresh_interval_ms, 2000);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_key() {
        let mut config = Config::default();
        config.store.key = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("store key"));
    }

    #[test]
    fn test_validate_zero_refresh_interval() {
        let mut config = Config::default();
        config.list.refresh_interval_ms = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("refresh_interval_ms"));
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("notes.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.store.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_refresh_interval() {
        let config = Config::default();
        assert_eq!(config.refresh_interval(), Duration::from_millis(2000));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("jotter"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[store]
key = "kitchen"

[list]
mode = "read_only"
auto_refresh = true
refresh_interval_ms = 500
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.store.key, "kitchen");
        assert_eq!(config.list.mode, Mode::ReadOnly);
        assert!(config.list.auto_refresh);
        assert_eq!(config.refresh_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[list]\nrefresh_interval_ms = 0\n").unwrap();

        let err = Config::load_from(Some(path)).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_list_config_deserialize() {
        let json = r#"{"mode": "read_only"}"#;
        let list: ListConfig = serde_json::from_str(json).unwrap();
        assert_eq!(list.mode, Mode::ReadOnly);
        assert_eq!(list.refresh_interval_ms, 2000);
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("refresh_interval_ms"));
        assert!(json.contains("\"mode\":\"editable\""));
    }
}
