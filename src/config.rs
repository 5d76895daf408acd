//! Configuration for the teamfold store.
//!
//! Loaded from a TOML file or built in code; every field has a default so a
//! bare `[teamfold]` deployment works out of the box.

use crate::error::{TeamFoldError, TeamFoldResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration consumed by [`crate::TeamFold::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamFoldConfig {
    /// Filesystem path of the embedded sled database
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    /// Default log filter, overridable through `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TeamFoldConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            log_level: default_log_level(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("teamfold")
        .join("db")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TeamFoldConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml(contents: &str) -> TeamFoldResult<Self> {
        toml::from_str(contents).map_err(|e| TeamFoldError::Config(e.to_string()))
    }

    /// Loads a configuration from a TOML file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> TeamFoldResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Returns a copy pointing at a different storage path.
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = path.into();
        self
    }
}
