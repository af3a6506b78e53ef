//! runx - run TypeScript/JavaScript scripts with inline dependencies
//!
//! Scripts declare their npm dependencies in a `@runx` doc-comment tag.
//! Each distinct dependency set is installed once into a content-addressed
//! cache and reused by every later run.

pub mod alias;
pub mod cache;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod metadata;
pub mod process;
pub mod version;

pub use error::{RunxError, RunxResult};
