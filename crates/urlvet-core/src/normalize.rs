//! URL normalization and deduplication.
//!
//! Raw inputs come from hand-maintained lists and may carry schemes, ports,
//! fragments, and inconsistent casing. The reputation service keys its
//! responses by a canonical form, so the cache must use the same form or
//! identical targets would miss each other across runs.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use url::Url;

/// Canonical lookup key for a URL or domain.
///
/// Scheme stripped, host lowercased (punycode for IDN), explicit port and
/// fragment removed, trailing `/` dropped when the path is empty, query
/// preserved. Normalizing an already-normalized key yields the same key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a raw input could not be turned into a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidUrl {
    #[error("empty input")]
    Empty,
    #[error("no host component in {0:?}")]
    NoHost(String),
    #[error("unparseable URL {input:?}: {reason}")]
    Unparseable { input: String, reason: String },
}

/// A raw input that was skipped during deduplication, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedUrl {
    pub raw: String,
    pub reason: InvalidUrl,
}

/// True when the input starts with an explicit scheme (`scheme://`).
///
/// Only a leading RFC 3986 scheme counts. A `://` later in the string, such
/// as a URL embedded in a redirect query parameter, must not suppress the
/// `http://` prefix or the input becomes unparseable.
fn has_explicit_scheme(s: &str) -> bool {
    match s.find("://") {
        Some(idx) if idx > 0 => {
            let mut chars = s[..idx].chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
        }
        _ => false,
    }
}

/// Normalizes a raw URL or bare domain into its canonical lookup key.
///
/// Inputs without a scheme (the common case in URL lists) are parsed as if
/// `http://` were present; the scheme never appears in the key either way.
pub fn normalize(raw: &str) -> Result<NormalizedUrl, InvalidUrl> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InvalidUrl::Empty);
    }

    let with_scheme = if has_explicit_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let parsed = Url::parse(&with_scheme).map_err(|e| InvalidUrl::Unparseable {
        input: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| InvalidUrl::NoHost(trimmed.to_string()))?;

    // Rebuild without scheme, port, or fragment. The url crate has already
    // lowercased and punycode-encoded the host.
    let mut key = String::from(host);
    let path = parsed.path();
    if path != "/" {
        key.push_str(path);
    }
    if let Some(query) = parsed.query() {
        key.push('?');
        key.push_str(query);
    }

    Ok(NormalizedUrl(key))
}

/// Normalizes a sequence of raw inputs and deduplicates by canonical key.
///
/// The returned keys preserve first-seen order so downstream reporting is
/// deterministic. Inputs that fail normalization are collected, never
/// silently dropped.
pub fn dedup_normalize<I, S>(raws: I) -> (Vec<NormalizedUrl>, Vec<SkippedUrl>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<NormalizedUrl> = HashSet::new();
    let mut keys = Vec::new();
    let mut skipped = Vec::new();

    for raw in raws {
        let raw = raw.as_ref();
        match normalize(raw) {
            Ok(key) => {
                if seen.insert(key.clone()) {
                    keys.push(key);
                }
            }
            Err(reason) => {
                tracing::debug!(input = raw, %reason, "skipping unnormalizable input");
                skipped.push(SkippedUrl {
                    raw: raw.to_string(),
                    reason,
                });
            }
        }
    }

    (keys, skipped)
}
