//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// runx - run TypeScript/JavaScript scripts with inline dependencies
///
/// Dependencies declared in a script's `@runx` metadata are installed once
/// into a shared cache and reused on every later run.
#[derive(Parser, Debug)]
#[command(name = "runx")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Script to run (optionally `script:alias`), followed by its arguments
    #[arg(
        value_name = "SCRIPT[:ALIAS] [ARGS]",
        trailing_var_arg = true,
        required_unless_present = "clean"
    )]
    pub command: Vec<String>,

    /// Remove all cached environments
    #[arg(long, conflicts_with = "command")]
    pub clean: bool,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(long, env = "RUNX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache root directory
    #[arg(long, env = "RUNX_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

impl Cli {
    /// The `script[:alias]` token
    pub fn script(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }

    /// Arguments after the script, passed through verbatim
    pub fn script_args(&self) -> &[String] {
        self.command.get(1..).unwrap_or_default()
    }
}
