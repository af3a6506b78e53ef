//! Configuration schema for runx
//!
//! Configuration is stored at `~/.config/runx/config.toml`

use crate::process::LaunchSpec;
use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Environment cache settings
    pub cache: CacheConfig,

    /// Installer and executor commands
    pub runtime: RuntimeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

impl GeneralConfig {
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// Environment cache configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root, platform cache directory when unset
    pub root: Option<PathBuf>,
}

/// Collaborator commands
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Program that runs scripts
    pub executor: String,

    /// Arguments placed before the script path
    pub executor_args: Vec<String>,

    /// Program that installs dependencies inside a cache entry
    pub installer: String,

    /// Installer arguments
    pub installer_args: Vec<String>,

    /// Variable the executor searches for modules
    pub module_path_var: String,
}

impl RuntimeConfig {
    /// Installer command, run inside the staging directory
    pub fn installer(&self) -> LaunchSpec {
        LaunchSpec::new(&self.installer).args(&self.installer_args)
    }

    /// Executor command, completed with the script path and its arguments
    pub fn executor(&self) -> LaunchSpec {
        LaunchSpec::new(&self.executor).args(&self.executor_args)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            executor: "bun".to_string(),
            executor_args: vec!["run".to_string()],
            installer: "bun".to_string(),
            installer_args: vec!["install".to_string()],
            module_path_var: "NODE_PATH".to_string(),
        }
    }
}
