//! Configuration management for fms.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::EntityStore;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory under the user config dir holding the config file.
const CONFIG_DIR_NAME: &str = "fms";

/// Prefix of environment overrides.
const ENV_PREFIX: &str = "FMS_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FMS_`, nested with `__`)
/// 2. TOML config file at `~/.config/fms/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Passenger name generation.
    pub roster: RosterConfig,
    /// Booking rules.
    pub booking: BookingConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory holding one sub-directory per collection.
    pub root: PathBuf,
}

/// Name lists used to generate passengers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Newline-delimited first names.
    pub names_file: PathBuf,
    /// Newline-delimited surnames.
    pub surnames_file: PathBuf,
    /// Fewest passengers a random fill generates when seats allow.
    pub min_generated_passengers: usize,
}

/// Booking rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    /// Refuse reservations beyond the airplane's capacity.
    pub enforce_capacity: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("fms"),
        }
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            names_file: PathBuf::from("names.txt"),
            surnames_file: PathBuf::from("surnames.txt"),
            min_generated_passengers: 100,
        }
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            enforce_capacity: true,
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
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `FMS_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation
    /// fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate one TOML file on top of the defaults, ignoring the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] if the file does not exist, or an
    /// error if it fails to parse or validate.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigValidation {
                message: format!("config file {} does not exist", path.display()),
            });
        }
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.root.as_os_str().is_empty() {
            return Err(Error::ConfigValidation {
                message: "storage root cannot be empty".to_string(),
            });
        }

        for (key, path) in [
            ("names_file", &self.roster.names_file),
            ("surnames_file", &self.roster.surnames_file),
        ] {
            if path.as_os_str().is_empty() {
                return Err(Error::ConfigValidation {
                    message: format!("{key} cannot be empty"),
                });
            }
        }

        Ok(())
    }

    /// Override the storage root.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.storage.root = root.into();
        self
    }

    /// Build the store this configuration describes, without touching the
    /// filesystem.
    #[must_use]
    pub fn entity_store(&self) -> EntityStore {
        EntityStore::new(&self.storage.root)
            .with_name_lists(&self.roster.names_file, &self.roster.surnames_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.storage.root, PathBuf::from("fms"));
        assert_eq!(config.roster.names_file, PathBuf::from("names.txt"));
        assert_eq!(config.roster.surnames_file, PathBuf::from("surnames.txt"));
        assert_eq!(config.roster.min_generated_passengers, 100);
        assert!(config.booking.enforce_capacity);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_root() {
        let config = Config::default().with_root("");

        let result = config.validate();
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("storage root"));
    }

    #[test]
    fn test_validate_empty_names_file() {
        let mut config = Config::default();
        config.roster.surnames_file = PathBuf::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("surnames_file"));
    }

    #[test]
    fn test_with_root() {
        let config = Config::default().with_root("/srv/fms");
        assert_eq!(config.storage.root, PathBuf::from("/srv/fms"));
        assert_eq!(config.entity_store().root(), Path::new("/srv/fms"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("fms"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        figment::Jail::expect_with(|_jail| {
            let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_toml_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [storage]
                root = "/data/fms"

                [roster]
                min_generated_passengers = 10
                "#,
            )?;
            jail.set_env("FMS_BOOKING__ENFORCE_CAPACITY", "false");
            jail.set_env("FMS_ROSTER__NAMES_FILE", "/lists/first.txt");

            let config = Config::load_from(Some(PathBuf::from("config.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.storage.root, PathBuf::from("/data/fms"));
            assert_eq!(config.roster.min_generated_passengers, 10);
            assert_eq!(config.roster.names_file, PathBuf::from("/lists/first.txt"));
            assert!(!config.booking.enforce_capacity);
            Ok(())
        });
    }

    #[test]
    fn test_load_file_missing() {
        let dir = TempDir::new().unwrap();
        let result = Config::load_file(&dir.path().join("absent.toml"));
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_load_file_rejects_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[storage]\nroot = \"\"\n").unwrap();
        assert!(Config::load_file(&path).is_err());

        fs::write(&path, "[storage]\nroot = \"/srv/fms\"\n").unwrap();
        let config = Config::load_file(&path).unwrap();
        assert_eq!(config.storage.root, PathBuf::from("/srv/fms"));
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("enforce_capacity"));
        assert!(json.contains("min_generated_passengers"));
    }

    #[test]
    fn test_storage_config_deserialize() {
        let json = r#"{"root": "/tmp/fms"}"#;
        let storage: StorageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(storage.root, PathBuf::from("/tmp/fms"));
    }
}
