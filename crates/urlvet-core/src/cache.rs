//! Persistent verdict cache.
//!
//! One JSON document mapping normalized URL keys to verdict records. The
//! cache is a performance optimization, not a source of truth: a missing or
//! corrupt file loads as empty with a warning, never as a fatal error.
//! Expiry is lazy: stale entries are treated as absent on read but stay in
//! the document until a fresh lookup overwrites them (or `prune_stale` is
//! called explicitly).

use crate::normalize::NormalizedUrl;
use crate::verdict::VerdictRecord;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default verdict age beyond which a cached entry is re-looked-up.
pub const DEFAULT_TTL_DAYS: u64 = 14;

/// Cache filename under the XDG cache directory.
const CACHE_FILE: &str = "verdicts.json";

/// Temporary suffix used before the atomic rename on save.
const TEMP_SUFFIX: &str = ".tmp";

pub fn ttl_from_days(days: u64) -> Duration {
    // `--ttl-days` is user-supplied; an absurd value saturates instead of
    // overflowing the multiplication.
    Duration::from_secs(days.saturating_mul(24 * 60 * 60))
}

/// Default cache location: `~/.cache/urlvet/verdicts.json`.
pub fn default_cache_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("urlvet")?;
    Ok(xdg_dirs.place_cache_file(CACHE_FILE)?)
}

/// Failure to persist the cache. Load failures are recovered internally and
/// never surface as errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("failed to write cache file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Counts reported by `stats`, split by freshness at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub total: usize,
    pub fresh: usize,
    pub stale: usize,
}

/// Mapping from normalized URL to its last-known verdict record.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerdictCache {
    entries: BTreeMap<NormalizedUrl, VerdictRecord>,
}

impl VerdictCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the cache from `path`. Missing file means a first run; a file
    /// that cannot be read or parsed is logged and treated as empty so the
    /// run proceeds with full lookups.
    pub fn load(path: &Path) -> Self {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no cache file yet, starting empty");
                return Self::new();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read cache file, starting empty");
                return Self::new();
            }
        };

        match serde_json::from_str(&data) {
            Ok(entries) => {
                let cache = VerdictCache { entries };
                tracing::debug!(path = %path.display(), entries = cache.len(), "cache loaded");
                cache
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt cache file, starting empty");
                Self::new()
            }
        }
    }

    /// Serializes the full cache atomically: write to a temp file next to
    /// the destination, then rename over it, so a crash mid-write leaves the
    /// previous file intact.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&self.entries)?;

        let mut temp = path.as_os_str().to_owned();
        temp.push(TEMP_SUFFIX);
        let temp = PathBuf::from(temp);

        fs::write(&temp, json).map_err(|source| CacheError::Io {
            path: temp.clone(),
            source,
        })?;
        fs::rename(&temp, path).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), entries = self.len(), "cache saved");
        Ok(())
    }

    /// Returns the record for `key` only while it is younger than `ttl`.
    /// A stale record reads as a miss but is left in place.
    pub fn fresh(&self, key: &NormalizedUrl, ttl: Duration, now: i64) -> Option<&VerdictRecord> {
        self.entries
            .get(key)
            .filter(|record| record.age(now) < ttl.as_secs() as i64)
    }

    /// Inserts or overwrites. Overwriting with a newer record is the only
    /// mutation path; fields of an existing record are never patched.
    pub fn insert(&mut self, key: NormalizedUrl, record: VerdictRecord) {
        self.entries.insert(key, record);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry counts split into fresh and stale at `now`.
    pub fn stats(&self, ttl: Duration, now: i64) -> CacheStats {
        let ttl_secs = ttl.as_secs() as i64;
        let fresh = self
            .entries
            .values()
            .filter(|r| r.age(now) < ttl_secs)
            .count();
        CacheStats {
            total: self.entries.len(),
            fresh,
            stale: self.entries.len() - fresh,
        }
    }

    /// Removes every stale entry, returning how many were dropped. Only used
    /// by explicit operator pruning; normal runs rely on lazy expiry.
    pub fn prune_stale(&mut self, ttl: Duration, now: i64) -> usize {
        let ttl_secs = ttl.as_secs() as i64;
        let before = self.entries.len();
        self.entries.retain(|_, r| r.age(now) < ttl_secs);
        before - self.entries.len()
    }
}
