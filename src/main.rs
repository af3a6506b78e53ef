//! runx - script runner with inline dependencies
//!
//! CLI entry point that dispatches to commands.

use clap::Parser;
use console::style;
use runx::cache::EnvironmentCache;
use runx::cli::Cli;
use runx::config::ConfigManager;
use runx::error::RunxResult;
use runx::process::{ProcessLauncher, SystemLauncher};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            match e.hint() {
                Some(hint) => eprintln!(
                    "{} {} {}",
                    style("Error:").red().bold(),
                    e,
                    style(format!("({hint})")).dim()
                ),
                None => eprintln!("{} {}", style("Error:").red().bold(), e),
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> RunxResult<i32> {
    let cli = Cli::parse();

    let config_manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await;
    init_logging(cli.verbose, config.as_ref().map(|c| c.general.json_logs()).unwrap_or(false));
    let config = config?;

    let cache_root = ConfigManager::cache_root(&config, cli.cache_dir.as_deref());
    let launcher: Arc<dyn ProcessLauncher> = Arc::new(SystemLauncher::new());

    if cli.clean {
        let cache = EnvironmentCache::new(cache_root, config.runtime.installer(), launcher);
        runx::cli::commands::clean(&cache).await?;
        return Ok(0);
    }

    let Some(script) = cli.script() else {
        return Ok(0);
    };
    runx::cli::commands::run(script, cli.script_args(), &config, cache_root, launcher).await
}

// 0 = warn, 1 = info, 2+ = debug; RUST_LOG wins when set
fn init_logging(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("runx=warn"),
        1 => EnvFilter::new("runx=info"),
        _ => EnvFilter::new("runx=debug"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
