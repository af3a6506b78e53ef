//! Content-addressed cache keys for dependency sets
//!
//! Same dependency set = same key, whatever order it was declared in.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Number of hex characters kept from the digest (64 bits)
pub const KEY_LEN: usize = 16;

/// Canonical serialisation of a dependency set
///
/// A JSON array of `[name, version]` pairs sorted by name bytes, e.g.
/// `[["chalk","5.3.0"],["zod","3.22.0"]]`. The empty set is `[]`.
pub fn canonical_form(dependencies: &BTreeMap<String, String>) -> String {
    // BTreeMap iterates in byte order of the keys
    let pairs: Vec<serde_json::Value> = dependencies
        .iter()
        .map(|(name, version)| serde_json::json!([name, version]))
        .collect();
    serde_json::Value::Array(pairs).to_string()
}

/// Derive the cache key for a dependency set
///
/// SHA256 over the canonical form, first 16 hex chars. Truncation is an
/// accepted collision risk for a local cache.
pub fn cache_key(dependencies: &BTreeMap<String, String>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_form(dependencies).as_bytes());
    let result = hasher.finalize();

    hex::encode(&result[..KEY_LEN / 2])
}
