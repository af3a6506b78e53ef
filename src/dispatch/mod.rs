//! Script execution dispatch
//!
//! Composes the final environment and argument list for a script and
//! hands it to the executor. Engine constraint failures only warn.

pub mod engines;

pub use engines::{mismatches, detect_versions, EngineMismatch};

use crate::cache::EnvironmentHandle;
use crate::error::{RunxError, RunxResult};
use crate::metadata::ScriptMetadata;
use crate::process::{LaunchSpec, ProcessLauncher};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Separator for path-list variables such as `NODE_PATH`
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: &str = ";";
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: &str = ":";

/// Runs scripts through the executor collaborator
pub struct ExecutionDispatcher {
    launcher: Arc<dyn ProcessLauncher>,
    executor: LaunchSpec,
    module_path_var: String,
    base_env: BTreeMap<String, String>,
}

impl ExecutionDispatcher {
    /// Create a dispatcher starting from the current process environment
    ///
    /// `executor` holds the program and any arguments placed before the
    /// script path (e.g. `bun run`).
    pub fn new(
        launcher: Arc<dyn ProcessLauncher>,
        executor: LaunchSpec,
        module_path_var: impl Into<String>,
    ) -> Self {
        Self {
            launcher,
            executor,
            module_path_var: module_path_var.into(),
            base_env: inherited_env(),
        }
    }

    /// Replace the environment the dispatcher starts from
    pub fn with_base_env(mut self, base_env: BTreeMap<String, String>) -> Self {
        self.base_env = base_env;
        self
    }

    /// Run a script and return its exit code verbatim
    pub async fn run(
        &self,
        handle: &EnvironmentHandle,
        metadata: &ScriptMetadata,
        script_path: &Path,
        cli_args: &[String],
    ) -> RunxResult<i32> {
        for mismatch in self.check_engines(metadata).await {
            warn!("{}", mismatch);
        }

        let spec = self.launch_spec(handle, metadata, script_path, cli_args)?;
        info!("Running {}", script_path.display());

        let code = self.launcher.run(&spec).await?;
        debug!("{} exited with code {}", script_path.display(), code);
        Ok(code)
    }

    /// Query declared engines and report constraint failures
    pub async fn check_engines(&self, metadata: &ScriptMetadata) -> Vec<EngineMismatch> {
        let Some(engines) = metadata.engines.as_ref().filter(|e| !e.is_empty()) else {
            return Vec::new();
        };
        let actual =
            detect_versions(self.launcher.as_ref(), engines, &self.executor.program).await;
        mismatches(engines, &actual)
    }

    /// Full command line handed to the executor
    pub fn launch_spec(
        &self,
        handle: &EnvironmentHandle,
        metadata: &ScriptMetadata,
        script_path: &Path,
        cli_args: &[String],
    ) -> RunxResult<LaunchSpec> {
        let script = std::path::absolute(script_path).map_err(|e| {
            RunxError::io(format!("resolving script path {}", script_path.display()), e)
        })?;

        Ok(self
            .executor
            .clone()
            .args([script.to_string_lossy().into_owned()])
            .args(compose_args(metadata, cli_args))
            .envs(self.compose_env(handle, metadata)))
    }

    /// Inherited environment, then metadata overrides, then the library path
    /// prepended to the module search path
    pub fn compose_env(
        &self,
        handle: &EnvironmentHandle,
        metadata: &ScriptMetadata,
    ) -> BTreeMap<String, String> {
        let mut env = self.base_env.clone();

        if let Some(overrides) = &metadata.env {
            env.extend(overrides.clone());
        }

        if let Some(library) = handle.library_path() {
            let library = library.to_string_lossy().into_owned();
            let value = match env.get(&self.module_path_var) {
                Some(existing) if !existing.is_empty() => {
                    format!("{}{}{}", library, PATH_LIST_SEPARATOR, existing)
                }
                _ => library,
            };
            env.insert(self.module_path_var.clone(), value);
        }

        env
    }
}

/// Default arguments from metadata, then the caller's arguments
pub fn compose_args(metadata: &ScriptMetadata, cli_args: &[String]) -> Vec<String> {
    metadata
        .args
        .iter()
        .flatten()
        .chain(cli_args)
        .cloned()
        .collect()
}

/// Current environment, skipping variables that are not valid UTF-8
fn inherited_env() -> BTreeMap<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}
