//! Tracker configuration
//!
//! Loaded from a JSON file named by `TRACKER_CONFIG` (all keys optional),
//! then overridden by `TRACKER_DATA_DIR` and `TRACKER_LOG`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::types::TrackingSet;

/// Environment variable naming the JSON config file
pub const CONFIG_ENV: &str = "TRACKER_CONFIG";
/// Environment variable overriding `data_dir`
pub const DATA_DIR_ENV: &str = "TRACKER_DATA_DIR";
/// Environment variable overriding `log_level`
pub const LOG_ENV: &str = "TRACKER_LOG";

/// Errors raised while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Directory holding `tracking.jsonl`
    pub data_dir: PathBuf,
    /// JSON structure catalog for the offline database
    pub catalog_path: Option<PathBuf>,
    /// Script the offline database appends executed statements to
    pub replay_path: Option<PathBuf>,
    /// Tracking set used when a caller does not name one
    pub default_statements: TrackingSet,
    /// Seed new table versions with `DROP TABLE IF EXISTS`
    pub add_drop_table: bool,
    /// Seed new view versions with `DROP VIEW IF EXISTS`
    pub add_drop_view: bool,
    /// Start tracking untracked tables when they are created
    pub version_auto_create: bool,
    /// Default tracing filter, e.g. `info` or `table_tracker=debug`
    pub log_level: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            catalog_path: None,
            replay_path: None,
            default_statements: TrackingSet::all(),
            add_drop_table: true,
            add_drop_view: true,
            version_auto_create: false,
            log_level: "info".to_string(),
        }
    }
}

impl TrackerConfig {
    /// Config with a custom data directory
    pub fn with_data_dir<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Load from `TRACKER_CONFIG` if set, then apply env overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(PathBuf::from(path))?,
            None => Self::default(),
        };

        if let Some(dir) = env::var_os(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(level) = env::var(LOG_ENV) {
            if !level.trim().is_empty() {
                config.log_level = level;
            }
        }

        Ok(config)
    }

    /// Read a JSON config file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Path of the version records file
    pub fn versions_path(&self) -> PathBuf {
        self.data_dir.join("tracking.jsonl")
    }
}
