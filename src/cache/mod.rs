//! Persistent cache of dependency environments
//!
//! Provides content-addressed environments keyed by the script's declared
//! dependency set. Entries never expire; `runx --clean` removes them all.
//!
//! # Layout
//!
//! ```text
//! <root>/
//!   hello-3f2a9c0d1b7e4a56/     ready entry
//!     package.json
//!     node_modules/
//!   .locks/hello-3f2a9c0d1b7e4a56.lock
//!   .staging/                  installs in progress
//! ```
//!
//! # Cache States
//!
//! | State | Description |
//! |-------|-------------|
//! | Absent | No directory, install on next run |
//! | Provisioning | Directory without `node_modules`, replaced on next run |
//! | Ready | Reused without invoking the installer |

pub mod entry;
pub mod environment;
pub mod key;

pub use entry::{script_base_name, CacheEntry, CacheState, LIBRARY_DIR, MANIFEST_FILE};
pub use environment::{EnvironmentCache, EnvironmentHandle};
pub use key::{cache_key, canonical_form, KEY_LEN};
