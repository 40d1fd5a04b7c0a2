//! Verdict classification and the cached record type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Threat names the service uses to mean "nothing found".
const EMPTY_THREATS: [&str; 2] = ["", "Not Available"];

/// Classification assigned to a URL.
///
/// The service's own taxonomy is undocumented, so the mapping is defensive:
/// any verdict label we do not recognize deserializes as `Unknown` instead of
/// failing the whole cache document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Verdict {
    /// Looked up successfully, no threat reported.
    Benign,
    /// The service reported a named threat.
    Malicious,
    /// Looked up successfully but the service returned no classification data.
    Unclassified,
    /// Lookup failed (batch error, or the URL was absent from the response).
    Unknown,
}

impl Verdict {
    fn as_str(self) -> &'static str {
        match self {
            Verdict::Benign => "benign",
            Verdict::Malicious => "malicious",
            Verdict::Unclassified => "unclassified",
            Verdict::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Verdict> for String {
    fn from(v: Verdict) -> Self {
        v.as_str().to_string()
    }
}

impl From<String> for Verdict {
    fn from(s: String) -> Self {
        match s.as_str() {
            "benign" => Verdict::Benign,
            "malicious" => Verdict::Malicious,
            "unclassified" => Verdict::Unclassified,
            _ => Verdict::Unknown,
        }
    }
}

/// One cached observation for a URL. Immutable once created; a refresh
/// inserts a new record rather than patching fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictRecord {
    pub verdict: Verdict,
    /// Raw threat name as reported by the service, when one was reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat: Option<String>,
    /// Raw category labels from the service, passed through untouched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    /// Unix seconds when this verdict was fetched.
    pub fetched_at: i64,
}

impl VerdictRecord {
    /// Builds a record from a per-URL service response entry.
    ///
    /// A missing, empty, or "Not Available" threat name means the service
    /// found nothing: benign if it still returned categories, unclassified
    /// if the entry was empty altogether.
    pub fn from_service(threat_name: Option<String>, categories: Vec<String>, now: i64) -> Self {
        let threat = threat_name.filter(|t| !EMPTY_THREATS.contains(&t.as_str()));
        let verdict = match (&threat, categories.is_empty()) {
            (Some(_), _) => Verdict::Malicious,
            (None, false) => Verdict::Benign,
            (None, true) => Verdict::Unclassified,
        };
        VerdictRecord {
            verdict,
            threat,
            categories,
            fetched_at: now,
        }
    }

    /// Placeholder for a URL whose lookup failed; lets a run make progress
    /// without retrying, until cache staleness triggers a fresh attempt.
    pub fn unknown(now: i64) -> Self {
        VerdictRecord {
            verdict: Verdict::Unknown,
            threat: None,
            categories: Vec::new(),
            fetched_at: now,
        }
    }

    /// Seconds elapsed since this record was fetched.
    pub fn age(&self, now: i64) -> i64 {
        now - self.fetched_at
    }
}

/// Current time as Unix seconds, the timestamp granularity of the cache.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
