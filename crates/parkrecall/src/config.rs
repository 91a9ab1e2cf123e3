//! Configuration management for parkrecall.
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
use crate::session::{SessionPolicy, DEFAULT_MAX_VEHICLE_NUMBER_LEN};
use crate::slot::{SlotGrid, DEFAULT_COLUMNS, DEFAULT_ROWS};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "parkrecall";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "parkrecall.db";

/// Prefix of environment variable overrides.
const ENV_PREFIX: &str = "PARKRECALL_";

/// Separator between section and key in environment variable names.
const ENV_SEPARATOR: &str = "__";

/// Default directions endpoint.
pub const DEFAULT_DIRECTIONS_BASE_URL: &str = "https://www.google.com/maps/dir/?api=1";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `PARKRECALL_`, sections and keys
///    separated by `__`, e.g. `PARKRECALL_MONITOR__POLL_INTERVAL_MS`)
/// 2. TOML config file at `~/.config/parkrecall/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Session validation rules.
    pub session: SessionConfig,
    /// Presence monitor configuration.
    pub monitor: MonitorSettings,
    /// Directions link configuration.
    pub navigation: NavigationConfig,
}

/// Which key-value backend holds the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// A local `SQLite` database.
    #[default]
    Sqlite,
    /// One file per key in a directory.
    File,
    /// Process memory; nothing persists.
    Memory,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::File => write!(f, "file"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend selection.
    pub backend: BackendKind,
    /// Path to the database file.
    /// Defaults to `~/.local/share/parkrecall/parkrecall.db`
    pub database_path: Option<PathBuf>,
    /// Directory for the file backend.
    /// Defaults to `~/.local/share/parkrecall`
    pub data_dir: Option<PathBuf>,
}

/// Session validation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum vehicle number length.
    pub max_vehicle_number_len: usize,
    /// Row letters of the lot, in order.
    pub slot_rows: String,
    /// Number of columns per row.
    pub slot_columns: u8,
    /// Reject slots that are not on the grid.
    pub enforce_slot_grid: bool,
}

/// Presence monitor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Interval between presence checks in milliseconds.
    pub poll_interval_ms: u64,
}

/// Navigation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Directions URL to which `&destination=lat,lon` is appended.
    pub directions_base_url: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_vehicle_number_len: DEFAULT_MAX_VEHICLE_NUMBER_LEN,
            slot_rows: DEFAULT_ROWS.to_string(),
            slot_columns: DEFAULT_COLUMNS,
            enforce_slot_grid: false,
        }
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            directions_base_url: DEFAULT_DIRECTIONS_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `PARKRECALL_`, nested with `__`)
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
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR));

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
        if self.session.max_vehicle_number_len == 0 {
            return Err(Error::config_validation(
                "max_vehicle_number_len must be greater than 0",
            ));
        }

        let rows = self.session.slot_rows.trim();
        if rows.is_empty() {
            return Err(Error::config_validation("slot_rows must not be empty"));
        }
        if let Some(bad) = rows.chars().find(|c| !c.is_ascii_alphabetic()) {
            return Err(Error::config_validation(format!(
                "slot_rows may only contain letters, found {bad:?}"
            )));
        }

        if self.session.slot_columns == 0 {
            return Err(Error::config_validation(
                "slot_columns must be greater than 0",
            ));
        }

        if self.monitor.poll_interval_ms == 0 {
            return Err(Error::config_validation(
                "poll_interval_ms must be greater than 0",
            ));
        }

        let url = &self.navigation.directions_base_url;
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(Error::config_validation(format!(
                "directions_base_url must be an http(s) URL, got {url:?}"
            )));
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the file backend directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the slot grid described by the session section.
    #[must_use]
    pub fn slot_grid(&self) -> SlotGrid {
        SlotGrid::new(self.session.slot_rows.trim(), self.session.slot_columns)
    }

    /// Build the validation policy from the session section.
    #[must_use]
    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            max_vehicle_number_len: self.session.max_vehicle_number_len,
            grid: self.slot_grid(),
            enforce_slot_grid: self.session.enforce_slot_grid,
        }
    }

    /// Get the monitor poll interval as a Duration.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.monitor.poll_interval_ms)
    }
}
