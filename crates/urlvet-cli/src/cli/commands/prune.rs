//! `urlvet cache-prune` – drop stale entries and rewrite the cache file.
//!
//! Normal runs expire lazily and never shrink the file; this is the explicit
//! operator path for reclaiming space.

use anyhow::{Context, Result};
use std::path::PathBuf;
use urlvet_core::cache::{ttl_from_days, VerdictCache};
use urlvet_core::config::UrlvetConfig;
use urlvet_core::verdict::unix_now;

use super::cache_path;

pub fn run_cache_prune(
    cfg: &UrlvetConfig,
    cache_override: Option<PathBuf>,
    ttl_days: Option<u64>,
) -> Result<()> {
    let cache_file = cache_path(cache_override)?;
    let ttl = ttl_from_days(ttl_days.unwrap_or(cfg.ttl_days));

    let mut cache = VerdictCache::load(&cache_file);
    let dropped = cache.prune_stale(ttl, unix_now());

    if dropped == 0 {
        println!("Nothing to prune ({} entries, all fresh).", cache.len());
        return Ok(());
    }

    cache
        .save(&cache_file)
        .with_context(|| format!("failed to rewrite pruned cache {}", cache_file.display()))?;
    println!("Pruned {} stale entries, {} remain.", dropped, cache.len());
    Ok(())
}
