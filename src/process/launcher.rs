//! Process launcher abstraction
//!
//! The installer and the script executor are both external processes.
//! Everything that starts one goes through this trait so the pipeline can
//! be exercised without either tool installed.

use crate::error::RunxResult;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A fully composed command line for a collaborator process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Program name or path
    pub program: String,
    /// Arguments after the program
    pub args: Vec<String>,
    /// Working directory (inherited when `None`)
    pub current_dir: Option<PathBuf>,
    /// Variables set on top of the inherited environment
    pub envs: BTreeMap<String, String>,
}

impl LaunchSpec {
    /// Create a spec for a program with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Append arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Set environment variables
    pub fn envs(mut self, envs: BTreeMap<String, String>) -> Self {
        self.envs = envs;
        self
    }
}

impl fmt::Display for LaunchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Abstract process launcher
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Run to completion with inherited stdio and return the exit code
    ///
    /// Fails only when the process could not be started; a non-zero exit
    /// is returned as `Ok(code)`.
    async fn run(&self, spec: &LaunchSpec) -> RunxResult<i32>;

    /// Run with captured stdout, returning it trimmed on success
    async fn capture(&self, spec: &LaunchSpec) -> Option<String>;
}
