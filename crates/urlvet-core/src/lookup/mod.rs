//! Batching client for the reputation service.
//!
//! Partitions a URL set into fixed-size batches and issues one blocking
//! request per batch. Failure isolation is batch-scoped: a transport error,
//! timeout, or malformed body marks every URL in that batch `Unknown` and the
//! run moves on to the next batch. There is no retry within a run; cache
//! staleness governs when a URL is attempted again.

mod response;
mod transport;

pub use response::{parse_lookup_response, WireEntry};
pub use transport::{HttpTransport, Transport};

use crate::normalize::NormalizedUrl;
use crate::verdict::VerdictRecord;
use std::collections::{BTreeMap, HashMap};

/// Consecutive batch failures after which the session is assumed to be
/// broken (typically an authentication redirect serving HTML to every
/// request). Surfaced prominently, but the run still completes.
const AUTH_SUSPECT_THRESHOLD: usize = 2;

/// Why a single batch failed. Recovered per batch; never aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("lookup endpoint returned HTTP {0}")]
    Http(u32),
    #[error("malformed response body: {0}")]
    Malformed(String),
}

impl From<curl::Error> for LookupError {
    fn from(e: curl::Error) -> Self {
        LookupError::Transport(e.to_string())
    }
}

/// Outcome of looking up a URL set: one record per requested URL, plus
/// aggregate failure accounting.
#[derive(Debug, Default)]
pub struct LookupReport {
    pub records: BTreeMap<NormalizedUrl, VerdictRecord>,
    /// Outbound requests issued.
    pub batches: usize,
    /// Batches whose URLs were all marked `Unknown`.
    pub failed_batches: usize,
    /// Set when repeated malformed responses suggest every further batch
    /// will fail identically (e.g. an expired authenticated session).
    pub auth_suspected: bool,
}

/// Issues batched lookups over a [`Transport`]. Does not touch the cache;
/// the orchestrator owns merging results into it.
pub struct BatchClient<T> {
    transport: T,
    batch_size: usize,
}

impl<T: Transport> BatchClient<T> {
    pub fn new(transport: T, batch_size: usize) -> Self {
        Self {
            transport,
            batch_size: batch_size.max(1),
        }
    }

    /// Looks up every URL, chunking in input order. Each returned record
    /// carries `fetched_at = now`.
    pub fn lookup(&self, urls: &[NormalizedUrl], now: i64) -> LookupReport {
        let mut report = LookupReport::default();
        let mut consecutive_failures = 0usize;

        for chunk in urls.chunks(self.batch_size) {
            report.batches += 1;
            tracing::info!(urls = chunk.len(), batch = report.batches, "looking up batch");

            match self.lookup_batch(chunk) {
                Ok(entries) => {
                    consecutive_failures = 0;
                    for url in chunk {
                        let record = match entries.get(url.as_str()) {
                            Some(entry) => VerdictRecord::from_service(
                                entry.threat_name.clone(),
                                entry.categories.clone(),
                                now,
                            ),
                            None => {
                                tracing::debug!(url = %url, "absent from response, marking unknown");
                                VerdictRecord::unknown(now)
                            }
                        };
                        report.records.insert(url.clone(), record);
                    }
                }
                Err(e) => {
                    report.failed_batches += 1;
                    consecutive_failures += 1;
                    tracing::warn!(error = %e, urls = chunk.len(), "batch failed, marking its URLs unknown");

                    if consecutive_failures >= AUTH_SUSPECT_THRESHOLD && !report.auth_suspected {
                        report.auth_suspected = true;
                        tracing::error!(
                            failures = consecutive_failures,
                            "repeated malformed responses; the session has likely hit an \
                             authentication redirect and remaining batches will fail the same way"
                        );
                    }

                    for url in chunk {
                        report.records.insert(url.clone(), VerdictRecord::unknown(now));
                    }
                }
            }
        }

        report
    }

    fn lookup_batch(&self, chunk: &[NormalizedUrl]) -> Result<HashMap<String, WireEntry>, LookupError> {
        let body = self.transport.post_lookup(chunk)?;
        parse_lookup_response(&body)
    }
}
