//! Environment cache lifecycle
//!
//! Resolves a script's dependency set to a provisioned directory under the
//! cache root, installing on a miss.
//!
//! Provisioning holds an exclusive lock on `<root>/.locks/<entry>.lock`,
//! installs into `<root>/.staging/<entry>-<uuid>/`, and renames the staging
//! directory into place only after the installer succeeds. Concurrent
//! resolutions of the same key wait on the lock and then find the entry
//! ready; no reader ever sees a half-installed entry directory.

use crate::cache::entry::{CacheEntry, CacheState, LIBRARY_DIR, MANIFEST_FILE};
use crate::error::{RunxError, RunxResult};
use crate::metadata::ScriptMetadata;
use crate::process::{LaunchSpec, ProcessLauncher};
use fs4::fs_std::FileExt;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Bookkeeping directory for provisioning locks
const LOCKS_DIR: &str = ".locks";

/// Bookkeeping directory for in-progress installs
const STAGING_DIR: &str = ".staging";

/// Resolved dependency environment for one script run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentHandle {
    /// Script declares no dependencies
    Empty,
    /// Provisioned entry
    Ready {
        /// Entry directory
        directory: PathBuf,
        /// Dependency directory to expose to the script
        library_path: PathBuf,
        /// True when no install was needed
        cache_hit: bool,
    },
}

impl EnvironmentHandle {
    /// Dependency directory, if any
    pub fn library_path(&self) -> Option<&Path> {
        match self {
            Self::Empty => None,
            Self::Ready { library_path, .. } => Some(library_path),
        }
    }

    /// Whether the environment was reused without installing
    pub fn is_cache_hit(&self) -> bool {
        matches!(self, Self::Ready { cache_hit: true, .. })
    }

    fn ready(entry: &CacheEntry, cache_hit: bool) -> Self {
        Self::Ready {
            directory: entry.directory.clone(),
            library_path: entry.library_path(),
            cache_hit,
        }
    }
}

/// Manifest written for the installer
#[derive(Debug, Serialize)]
struct Manifest<'a> {
    name: &'static str,
    version: &'static str,
    private: bool,
    dependencies: &'a BTreeMap<String, String>,
}

impl<'a> Manifest<'a> {
    fn new(dependencies: &'a BTreeMap<String, String>) -> Self {
        Self {
            name: "runx-env",
            version: "0.0.0",
            private: true,
            dependencies,
        }
    }
}

/// On-disk cache of dependency environments
///
/// Owns everything under its root directory.
pub struct EnvironmentCache {
    root: PathBuf,
    installer: LaunchSpec,
    launcher: Arc<dyn ProcessLauncher>,
}

impl EnvironmentCache {
    /// Create a cache rooted at `root`, installing with `installer`
    pub fn new(root: PathBuf, installer: LaunchSpec, launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self {
            root,
            installer,
            launcher,
        }
    }

    /// Entry a script's dependency set maps to
    pub fn entry(&self, metadata: &ScriptMetadata, script_path: &Path) -> CacheEntry {
        CacheEntry::new(&self.root, script_path, &metadata.dependencies)
    }

    /// Resolve the environment for a script, installing on a miss
    pub async fn resolve(
        &self,
        metadata: &ScriptMetadata,
        script_path: &Path,
    ) -> RunxResult<EnvironmentHandle> {
        if !metadata.has_dependencies() {
            debug!("No dependencies declared, skipping environment");
            return Ok(EnvironmentHandle::Empty);
        }

        let entry = self.entry(metadata, script_path);
        if entry.state() == CacheState::Ready {
            debug!("Cache hit: {}", entry.name);
            return Ok(EnvironmentHandle::ready(&entry, true));
        }

        fs::create_dir_all(&self.root).await.map_err(|e| {
            RunxError::io(format!("creating cache root {}", self.root.display()), e)
        })?;

        let _lock = self.lock(&entry).await?;

        // Another process may have finished while we waited
        if entry.state() == CacheState::Ready {
            debug!("Cache populated while waiting for lock: {}", entry.name);
            return Ok(EnvironmentHandle::ready(&entry, true));
        }

        self.sweep_staging(&entry).await;
        self.provision(&entry, &metadata.dependencies).await?;
        Ok(EnvironmentHandle::ready(&entry, false))
    }

    /// Remove every cached environment, returning how many were removed
    pub async fn purge(&self) -> RunxResult<usize> {
        if !self.root.exists() {
            debug!("Cache root {} does not exist", self.root.display());
            return Ok(0);
        }

        let mut entries = fs::read_dir(&self.root).await.map_err(|e| {
            RunxError::io(format!("reading cache root {}", self.root.display()), e)
        })?;

        let mut count = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RunxError::io("listing cache entries", e))?
        {
            if !entry.file_name().to_string_lossy().starts_with('.') {
                count += 1;
            }
        }

        fs::remove_dir_all(&self.root).await.map_err(|e| {
            RunxError::io(format!("removing cache root {}", self.root.display()), e)
        })?;

        info!("Removed {} cached environment(s)", count);
        Ok(count)
    }

    /// Install into a staging directory and publish it as the entry
    async fn provision(
        &self,
        entry: &CacheEntry,
        dependencies: &BTreeMap<String, String>,
    ) -> RunxResult<()> {
        let staging = self
            .root
            .join(STAGING_DIR)
            .join(format!("{}-{}", entry.name, Uuid::new_v4()));

        fs::create_dir_all(&staging).await.map_err(|e| {
            RunxError::io(format!("creating staging directory {}", staging.display()), e)
        })?;

        let manifest = serde_json::to_string_pretty(&Manifest::new(dependencies))?;
        let manifest_path = staging.join(MANIFEST_FILE);
        fs::write(&manifest_path, manifest)
            .await
            .map_err(|e| RunxError::io(format!("writing {}", manifest_path.display()), e))?;

        info!("Installing dependencies for {}", entry.name);
        let spec = self.installer.clone().current_dir(&staging);
        match self.launcher.run(&spec).await {
            Ok(0) => {}
            Ok(code) => {
                discard(&staging).await;
                return Err(RunxError::InstallFailed { code });
            }
            Err(e) => {
                discard(&staging).await;
                return Err(e);
            }
        }

        if !staging.join(LIBRARY_DIR).is_dir() {
            warn!(
                "Installer succeeded but produced no {} for {}; it will be reinstalled next run",
                LIBRARY_DIR, entry.name
            );
        }

        if let Err(e) = publish(&staging, &entry.directory).await {
            discard(&staging).await;
            return Err(e);
        }

        info!("Environment ready: {}", entry.directory.display());
        Ok(())
    }

    /// Remove staging directories left by killed installs of this entry
    ///
    /// Must be called with the entry's lock held.
    async fn sweep_staging(&self, entry: &CacheEntry) {
        let Ok(mut dirs) = fs::read_dir(self.root.join(STAGING_DIR)).await else {
            return;
        };
        let prefix = format!("{}-", entry.name);
        while let Ok(Some(dir)) = dirs.next_entry().await {
            let name = dir.file_name().to_string_lossy().into_owned();
            let stale = name
                .strip_prefix(&prefix)
                .is_some_and(|rest| Uuid::parse_str(rest).is_ok());
            if stale {
                debug!("Removing stale staging directory {}", dir.path().display());
                discard(&dir.path()).await;
            }
        }
    }

    async fn lock(&self, entry: &CacheEntry) -> RunxResult<File> {
        let path = self.root.join(LOCKS_DIR).join(format!("{}.lock", entry.name));
        tokio::task::spawn_blocking(move || acquire_lock(&path))
            .await
            .map_err(|e| RunxError::Internal(format!("lock task failed: {}", e)))?
    }
}

/// Block until an exclusive lock on `path` is held
fn acquire_lock(path: &Path) -> RunxResult<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| RunxError::io(format!("creating lock directory {}", parent.display()), e))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(|e| RunxError::io(format!("opening lock {}", path.display()), e))?;

    debug!("Waiting for lock {}", path.display());
    file.lock_exclusive()
        .map_err(|e| RunxError::io(format!("locking {}", path.display()), e))?;
    Ok(file)
}

/// Move a finished staging directory onto the entry path
async fn publish(staging: &Path, directory: &Path) -> RunxResult<()> {
    // Leftover from an interrupted install that predates staging
    if fs::try_exists(directory).await.unwrap_or(false) {
        debug!("Replacing incomplete entry {}", directory.display());
        fs::remove_dir_all(directory)
            .await
            .map_err(|e| RunxError::io(format!("removing {}", directory.display()), e))?;
    }

    fs::rename(staging, directory)
        .await
        .map_err(|e| RunxError::io(format!("publishing {}", directory.display()), e))
}

/// Best-effort removal of a failed staging directory
async fn discard(staging: &Path) {
    if let Err(e) = fs::remove_dir_all(staging).await {
        warn!("Failed to remove {}: {}", staging.display(), e);
    }
}
