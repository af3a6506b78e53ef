//! Script targets and argument aliases
//!
//! `runx server.ts:dev` runs `server.ts` with the arguments declared under
//! the `dev` alias in its metadata.

use crate::error::{RunxError, RunxResult};
use crate::metadata::ScriptMetadata;
use std::path::{Path, PathBuf};

/// A script path with an optional alias, as given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTarget {
    pub script_path: PathBuf,
    pub alias: Option<String>,
}

impl ScriptTarget {
    /// Split a raw `path[:alias]` token
    ///
    /// An existing file always wins, so paths containing colons stay
    /// usable. Otherwise the token splits on its last colon; an empty
    /// suffix means no alias.
    pub fn parse(raw: &str) -> Self {
        if Path::new(raw).exists() {
            return Self::path_only(raw);
        }

        match raw.rsplit_once(':') {
            Some((path, alias)) if !alias.is_empty() => Self {
                script_path: PathBuf::from(path),
                alias: Some(alias.to_string()),
            },
            Some((path, _)) => Self::path_only(path),
            None => Self::path_only(raw),
        }
    }

    fn path_only(path: &str) -> Self {
        Self {
            script_path: PathBuf::from(path),
            alias: None,
        }
    }
}

/// Expand an alias into its argument prefix
pub fn expand(metadata: &ScriptMetadata, alias: &str) -> RunxResult<Vec<String>> {
    let raw = metadata
        .scripts
        .get(alias)
        .ok_or_else(|| RunxError::AliasNotFound {
            alias: alias.to_string(),
            available: metadata.alias_names(),
        })?;

    Ok(raw.split_whitespace().map(str::to_string).collect())
}
