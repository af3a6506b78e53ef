//! Cache entry naming and state
//!
//! Each entry lives at `<root>/<script>-<key>/` and is ready once the
//! installer has produced its `node_modules` directory.

use crate::cache::key::cache_key;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Installer-produced dependency directory, doubling as the ready marker
pub const LIBRARY_DIR: &str = "node_modules";

/// Manifest handed to the installer
pub const MANIFEST_FILE: &str = "package.json";

/// State of a cache entry on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No directory exists
    Absent,
    /// Directory exists without a library dir (interrupted or legacy install)
    Provisioning,
    /// Library dir present, usable as-is
    Ready,
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Provisioning => write!(f, "provisioning"),
            Self::Ready => write!(f, "ready"),
        }
    }
}

/// A cache entry derived from a script and its dependency set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Dependency-set key (16 hex chars)
    pub key: String,
    /// Directory name (`<script>-<key>`)
    pub name: String,
    /// Full path of the entry directory
    pub directory: PathBuf,
}

impl CacheEntry {
    /// Compute the entry for a script under a cache root
    pub fn new(root: &Path, script_path: &Path, dependencies: &BTreeMap<String, String>) -> Self {
        let key = cache_key(dependencies);
        let name = format!("{}-{}", script_base_name(script_path), key);
        Self {
            directory: root.join(&name),
            key,
            name,
        }
    }

    /// Path of the dependency directory
    pub fn library_path(&self) -> PathBuf {
        self.directory.join(LIBRARY_DIR)
    }

    /// Inspect the entry on disk
    pub fn state(&self) -> CacheState {
        if self.library_path().is_dir() {
            CacheState::Ready
        } else if self.directory.exists() {
            CacheState::Provisioning
        } else {
            CacheState::Absent
        }
    }
}

/// File name with only its final extension removed
///
/// `my.script.test.ts` becomes `my.script.test`; a dotfile such as
/// `.hidden` keeps its full name.
pub fn script_base_name(script_path: &Path) -> String {
    let file_name = script_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "script".to_string());

    match file_name.rfind('.') {
        Some(idx) if idx > 0 => file_name[..idx].to_string(),
        _ => file_name,
    }
}
