//! Lookup orchestrator: composes normalizer, cache, and batch client.
//!
//! One call resolves a whole raw URL list: normalize and deduplicate, serve
//! what the cache still holds fresh, batch-look-up the rest, merge, and
//! write the new records back into the cache. The caller owns loading and
//! saving the cache around the run.

use crate::cache::VerdictCache;
use crate::lookup::{BatchClient, Transport};
use crate::normalize::{dedup_normalize, NormalizedUrl, SkippedUrl};
use crate::verdict::VerdictRecord;
use std::collections::BTreeMap;
use std::time::Duration;

/// Counters accumulated over one `resolve` run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LookupStats {
    /// Entries served from a fresh cache record.
    pub cache_hits: usize,
    /// Entries actually fetched from the service, including failed ones.
    pub lookups: usize,
    /// Raw inputs that failed normalization.
    pub skipped: usize,
    /// Batches that failed as a unit.
    pub failed_batches: usize,
}

/// Result of resolving a raw URL list.
#[derive(Debug)]
pub struct Resolution {
    /// One verdict per distinct normalized input, cache hits and fresh
    /// lookups merged.
    pub verdicts: BTreeMap<NormalizedUrl, VerdictRecord>,
    pub stats: LookupStats,
    /// Inputs that could not be normalized, with reasons.
    pub skipped: Vec<SkippedUrl>,
    /// Mirrors the batch client's broken-session signal.
    pub auth_suspected: bool,
}

/// Resolves `raw_urls` against the cache and the reputation service.
///
/// Every input that normalizes successfully appears exactly once in
/// `verdicts`; the rest are reported in `skipped`. Newly fetched records
/// (including `Unknown` placeholders for failed batches) are written into
/// `cache`; persisting it is the caller's responsibility.
pub fn resolve<T, I, S>(
    raw_urls: I,
    cache: &mut VerdictCache,
    client: &BatchClient<T>,
    ttl: Duration,
    now: i64,
) -> Resolution
where
    T: Transport,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let (requested, skipped) = dedup_normalize(raw_urls);

    let mut verdicts: BTreeMap<NormalizedUrl, VerdictRecord> = BTreeMap::new();
    let mut misses: Vec<NormalizedUrl> = Vec::new();

    for url in &requested {
        match cache.fresh(url, ttl, now) {
            Some(record) => {
                verdicts.insert(url.clone(), record.clone());
            }
            None => misses.push(url.clone()),
        }
    }

    let cache_hits = verdicts.len();
    let lookups = misses.len();

    let report = client.lookup(&misses, now);
    for (url, record) in report.records {
        cache.insert(url.clone(), record.clone());
        verdicts.insert(url, record);
    }

    tracing::info!(
        cache_hits,
        lookups,
        skipped = skipped.len(),
        failed_batches = report.failed_batches,
        "resolution complete"
    );

    Resolution {
        verdicts,
        stats: LookupStats {
            cache_hits,
            lookups,
            skipped: skipped.len(),
            failed_batches: report.failed_batches,
        },
        skipped,
        auth_suspected: report.auth_suspected,
    }
}
