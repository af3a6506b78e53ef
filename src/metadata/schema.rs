//! Metadata schema for scripts
//!
//! A script declares its metadata in a `@runx` JSON payload:
//!
//! ```text
//! /**
//!  * @runx {
//!  *   "dependencies": { "chalk": "^5.3.0" },
//!  *   "scripts": { "dev": "--watch --port 3000" },
//!  *   "env": { "NODE_ENV": "development" },
//!  *   "engines": { "bun": ">=1.0" },
//!  *   "args": ["--verbose"]
//!  * }
//!  */
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata declared by a single script
///
/// `dependencies` and `scripts` default to empty maps. The optional
/// sections stay `None` when the payload omits them so "no overrides" and
/// "empty overrides" remain distinguishable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptMetadata {
    /// Package name to version constraint
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    /// Alias name to raw argument string
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,

    /// Environment overrides applied to the script process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,

    /// Engine name to version constraint (advisory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engines: Option<BTreeMap<String, String>>,

    /// Default arguments placed before user arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
}

impl ScriptMetadata {
    /// Whether the script needs a provisioned environment
    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }

    /// Declared alias names in sorted order
    pub fn alias_names(&self) -> Vec<String> {
        self.scripts.keys().cloned().collect()
    }
}

/// Outcome of scanning a script for metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    /// No doc comment, no `@runx` tag, or a tag without a payload
    NoMetadata,
    /// A payload was found and decoded
    Declared(ScriptMetadata),
}

impl Extracted {
    /// Collapse into metadata, applying defaults when nothing was declared
    pub fn into_metadata(self) -> ScriptMetadata {
        match self {
            Self::NoMetadata => ScriptMetadata::default(),
            Self::Declared(metadata) => metadata,
        }
    }
}
