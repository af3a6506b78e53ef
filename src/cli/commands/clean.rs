//! Clean command - remove every cached environment

use crate::cache::EnvironmentCache;
use crate::error::RunxResult;
use console::style;

/// Purge the cache and report what was removed
pub async fn execute(cache: &EnvironmentCache) -> RunxResult<()> {
    let removed = cache.purge().await?;

    if removed == 0 {
        println!("Cache is already empty.");
    } else {
        println!(
            "{} {} cached environment(s).",
            style("Cleaned").green(),
            removed
        );
    }

    Ok(())
}
