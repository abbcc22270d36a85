use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::providers::currency_api::DEFAULT_BASE_URL;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourceConfig {
    pub base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    /// Directory for cached rate snapshots; the platform data dir when unset.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Favorites file location; the platform data dir when unset.
    #[serde(default)]
    pub favorites_path: Option<PathBuf>,
    /// Base currency for the `rates` command when none is given.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "usd".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            source: SourceConfig::default(),
            cache_dir: None,
            favorites_path: None,
            currency: default_currency(),
        }
    }
}

impl AppConfig {
    /// Loads the config from its default location; a missing file means the
    /// built-in defaults, not an error.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Cache directory for rate snapshots, explicit or platform default.
    pub fn resolved_cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        Ok(Self::project_dirs()?.data_dir().join("cache"))
    }

    /// Favorites file location, explicit or platform default.
    pub fn resolved_favorites_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.favorites_path {
            return Ok(path.clone());
        }
        Ok(Self::project_dirs()?.data_dir().join("favorites.json"))
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "fxtab", "fxtab")
            .context("Could not determine project directories")
    }
}
