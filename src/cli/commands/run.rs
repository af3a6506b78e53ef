//! Run command - resolve a script's environment and execute it

use crate::alias::{self, ScriptTarget};
use crate::cache::{CacheState, EnvironmentCache};
use crate::config::Config;
use crate::dispatch::ExecutionDispatcher;
use crate::error::{RunxError, RunxResult};
use crate::metadata;
use crate::process::ProcessLauncher;
use console::style;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Execute a script, returning its exit code
pub async fn execute(
    target: &str,
    user_args: &[String],
    config: &Config,
    cache_root: PathBuf,
    launcher: Arc<dyn ProcessLauncher>,
) -> RunxResult<i32> {
    let target = ScriptTarget::parse(target);
    let script = &target.script_path;

    if !tokio::fs::try_exists(script).await.unwrap_or(false) {
        return Err(RunxError::ScriptNotFound(script.clone()));
    }

    let metadata = metadata::extract_file(script).await?;
    debug!(
        "{} declares {} dependencies",
        script.display(),
        metadata.dependencies.len()
    );

    let mut args = match &target.alias {
        Some(name) => alias::expand(&metadata, name)?,
        None => Vec::new(),
    };
    args.extend_from_slice(user_args);

    let runtime = &config.runtime;
    which::which(&runtime.executor).map_err(|_| RunxError::ExecutorNotFound {
        program: runtime.executor.clone(),
    })?;

    let cache = EnvironmentCache::new(cache_root, runtime.installer(), launcher.clone());

    if metadata.has_dependencies() && cache.entry(&metadata, script).state() != CacheState::Ready
    {
        eprintln!("{}", style("Installing dependencies...").dim());
    }
    let handle = cache.resolve(&metadata, script).await?;

    let dispatcher =
        ExecutionDispatcher::new(launcher, runtime.executor(), &runtime.module_path_var);
    dispatcher.run(&handle, &metadata, script, &args).await
}
