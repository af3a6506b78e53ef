//! Error types for runx
//!
//! All modules use `RunxResult<T>` as their return type. Every variant is
//! fatal for the pipeline; engine mismatches are warnings and never show up
//! here.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for runx operations
pub type RunxResult<T> = Result<T, RunxError>;

/// All errors that can occur in runx
#[derive(Error, Debug)]
pub enum RunxError {
    // Script errors
    #[error("File not found: {}", .0.display())]
    ScriptNotFound(PathBuf),

    #[error("Invalid JSON in @runx metadata: {reason}: {fragment}")]
    MetadataParse { fragment: String, reason: String },

    #[error("Script alias '{alias}' not found{}", format_available(.available))]
    AliasNotFound {
        alias: String,
        available: Vec<String>,
    },

    // Collaborator errors
    #[error("Dependency install failed with exit code {code}")]
    InstallFailed { code: i32 },

    #[error("Failed to launch {program}: {source}")]
    ExecutorLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} is required but was not found on PATH")]
    ExecutorNotFound { program: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!(". Available: {}", available.join(", "))
    }
}

impl RunxError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a launch error for a collaborator process
    pub fn launch(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::ExecutorLaunch {
            program: program.into(),
            source,
        }
    }

    /// Process exit code the CLI reports for this error
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ExecutorNotFound { .. } => Some("Install bun: https://bun.sh"),
            Self::MetadataParse { .. } => {
                Some("@runx payloads must be strict JSON (quoted keys, no trailing commas)")
            }
            Self::InstallFailed { .. } => Some("Run with -v for details, or `runx --clean` to reset the cache"),
            _ => None,
        }
    }
}
