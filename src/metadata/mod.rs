//! Script metadata: schema and extraction
//!
//! Scripts carry their dependency declarations in a leading doc comment.
//! Absence of that block is a valid state (defaults apply); a block that
//! cannot be decoded is an error.

pub mod extract;
pub mod schema;

pub use extract::{extract, extract_file, parse, TAG};
pub use schema::{Extracted, ScriptMetadata};
