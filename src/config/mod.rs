//! Configuration management for runx

pub mod schema;

pub use schema::{CacheConfig, Config, GeneralConfig, RuntimeConfig};

use crate::error::{RunxError, RunxResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("runx")
            .join("config.toml")
    }

    /// Default environment cache root
    pub fn default_cache_root() -> PathBuf {
        dirs::cache_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join("runx")
            .join("envs")
    }

    /// Resolve the cache root: explicit override, then config, then default
    pub fn cache_root(config: &Config, override_root: Option<&Path>) -> PathBuf {
        override_root
            .map(Path::to_path_buf)
            .or_else(|| config.cache.root.clone())
            .unwrap_or_else(Self::default_cache_root)
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub async fn load(&self) -> RunxResult<Config> {
        if !fs::try_exists(&self.config_path).await.unwrap_or(false) {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    async fn load_from_file(&self, path: &Path) -> RunxResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| RunxError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| RunxError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
