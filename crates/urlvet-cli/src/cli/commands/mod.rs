//! CLI command handlers. Each command is in its own file for clarity.

mod prune;
mod scan;
mod stats;

pub use prune::run_cache_prune;
pub use scan::run_scan;
pub use stats::run_cache_stats;

use anyhow::Result;
use std::path::PathBuf;
use urlvet_core::cache;

/// Resolves the cache file to operate on: explicit flag wins, otherwise the
/// default XDG location.
pub(crate) fn cache_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => cache::default_cache_path(),
    }
}
