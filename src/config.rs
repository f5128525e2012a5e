// Configuration
// Loaded from a TOML file and overridden by command-line flags

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::query::plan::RenderMode;

/// Tool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path of the SQLite file holding the records
    #[serde(default = "default_store_location")]
    pub store_location: PathBuf,

    /// Render mode for list queries
    #[serde(default)]
    pub default_render_mode: RenderMode,
}

fn default_store_location() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("anniversaries")
        .join("anniversaries.db")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_location: default_store_location(),
            default_render_mode: RenderMode::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `<config dir>/anniversaries/config.toml`, or the built-in
    /// defaults when there is none
    pub fn load_default() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// The default configuration file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("anniversaries").join("config.toml"))
    }
}
