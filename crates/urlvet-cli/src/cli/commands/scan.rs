//! `urlvet scan <LIST>` – resolve a URL list and mark threats.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use urlvet_core::cache::{ttl_from_days, VerdictCache};
use urlvet_core::config::UrlvetConfig;
use urlvet_core::engine::Resolution;
use urlvet_core::lookup::{BatchClient, HttpTransport};
use urlvet_core::normalize::NormalizedUrl;
use urlvet_core::verdict::{unix_now, Verdict, VerdictRecord};

use super::cache_path;

pub fn run_scan(
    cfg: &UrlvetConfig,
    list: &Path,
    cache_override: Option<PathBuf>,
    ttl_days: Option<u64>,
    json_export: Option<PathBuf>,
) -> Result<()> {
    // The input list is the one thing a run cannot proceed without.
    let raw = fs::read_to_string(list)
        .with_context(|| format!("failed to read URL list {}", list.display()))?;
    let raws: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    tracing::info!(list = %list.display(), urls = raws.len(), "resolving URL list");

    let cache_file = cache_path(cache_override)?;
    let ttl = ttl_from_days(ttl_days.unwrap_or(cfg.ttl_days));
    let client = BatchClient::new(HttpTransport::from_config(cfg), cfg.batch_size);

    let mut cache = VerdictCache::load(&cache_file);
    let res = urlvet_core::resolve(raws, &mut cache, &client, ttl, unix_now());

    // Persist before exporting so a failed export cannot cost the lookups.
    if let Err(e) = cache.save(&cache_file) {
        tracing::warn!(error = %e, "could not persist cache; this run's results are unaffected");
        eprintln!("warning: cache not saved: {e}");
    }

    if res.auth_suspected {
        eprintln!(
            "warning: repeated malformed responses from the lookup endpoint; \
             the session is likely no longer authenticated"
        );
    }

    print_summary(&res);

    if let Some(path) = json_export {
        export_json(&res.verdicts, &path)?;
        println!("Exported verdicts to {}", path.display());
    }

    Ok(())
}

fn print_summary(res: &Resolution) {
    let mut benign = 0usize;
    let mut malicious = 0usize;
    let mut unclassified = 0usize;
    let mut unknown = 0usize;
    for record in res.verdicts.values() {
        match record.verdict {
            Verdict::Benign => benign += 1,
            Verdict::Malicious => malicious += 1,
            Verdict::Unclassified => unclassified += 1,
            Verdict::Unknown => unknown += 1,
        }
    }

    println!(
        "{} URLs resolved: {} malicious, {} benign, {} unclassified, {} unknown",
        res.verdicts.len(),
        malicious,
        benign,
        unclassified,
        unknown
    );
    println!(
        "cache_hits={} lookups={} skipped={} failed_batches={}",
        res.stats.cache_hits, res.stats.lookups, res.stats.skipped, res.stats.failed_batches
    );

    if malicious > 0 {
        println!("{:<50} {}", "URL", "THREAT");
        for (url, record) in &res.verdicts {
            if record.verdict == Verdict::Malicious {
                println!(
                    "{:<50} {}",
                    url,
                    record.threat.as_deref().unwrap_or("-")
                );
            }
        }
    }

    for skipped in &res.skipped {
        eprintln!("skipped {:?}: {}", skipped.raw, skipped.reason);
    }
}

fn export_json(verdicts: &BTreeMap<NormalizedUrl, VerdictRecord>, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(verdicts).context("failed to serialize verdicts")?;
    fs::write(path, json)
        .with_context(|| format!("failed to write JSON export {}", path.display()))?;
    Ok(())
}
