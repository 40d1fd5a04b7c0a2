//! `urlvet cache-stats` – show verdict cache entry counts.

use anyhow::Result;
use std::path::PathBuf;
use urlvet_core::cache::{ttl_from_days, VerdictCache};
use urlvet_core::config::UrlvetConfig;
use urlvet_core::verdict::unix_now;

use super::cache_path;

pub fn run_cache_stats(
    cfg: &UrlvetConfig,
    cache_override: Option<PathBuf>,
    ttl_days: Option<u64>,
) -> Result<()> {
    let cache_file = cache_path(cache_override)?;
    let ttl = ttl_from_days(ttl_days.unwrap_or(cfg.ttl_days));

    let cache = VerdictCache::load(&cache_file);
    let stats = cache.stats(ttl, unix_now());

    println!("{:<8} {:<8} {:<8} {}", "TOTAL", "FRESH", "STALE", "FILE");
    println!(
        "{:<8} {:<8} {:<8} {}",
        stats.total,
        stats.fresh,
        stats.stale,
        cache_file.display()
    );
    Ok(())
}
