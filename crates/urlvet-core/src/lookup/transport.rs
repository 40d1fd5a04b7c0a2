//! Blocking HTTP transport for batch lookups.
//!
//! Uses the curl crate (libcurl) to POST the batch as JSON and return the
//! raw response body. The `Transport` trait is the seam the orchestrator and
//! tests depend on; only `HttpTransport` knows about curl.

use crate::config::UrlvetConfig;
use crate::lookup::LookupError;
use crate::normalize::NormalizedUrl;
use std::time::Duration;

/// One outbound batch request. Implementations must stay within the caller's
/// batch size; chunking is the batch client's job, not the transport's.
pub trait Transport {
    fn post_lookup(&self, urls: &[NormalizedUrl]) -> Result<String, LookupError>;
}

/// Real transport: blocking JSON POST against the configured endpoint.
pub struct HttpTransport {
    endpoint: String,
    timeout: Duration,
    connect_timeout: Duration,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration, connect_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
            connect_timeout,
        }
    }

    pub fn from_config(cfg: &UrlvetConfig) -> Self {
        Self::new(cfg.endpoint.clone(), cfg.timeout(), cfg.connect_timeout())
    }
}

impl Transport for HttpTransport {
    fn post_lookup(&self, urls: &[NormalizedUrl]) -> Result<String, LookupError> {
        let body = serde_json::json!({ "urls": urls }).to_string();

        let mut easy = curl::easy::Easy::new();
        easy.url(&self.endpoint)?;
        easy.post(true)?;
        easy.post_fields_copy(body.as_bytes())?;
        easy.follow_location(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;

        let mut list = curl::easy::List::new();
        list.append("Content-Type: application/json")?;
        list.append("Accept: application/json")?;
        easy.http_headers(list)?;

        let mut response: Vec<u8> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                response.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(LookupError::Http(code));
        }

        String::from_utf8(response).map_err(|e| LookupError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_uses_configured_timeouts() {
        let mut cfg = UrlvetConfig::default();
        cfg.timeout_secs = 20;
        cfg.connect_timeout_secs = Some(5);
        let t = HttpTransport::from_config(&cfg);
        assert_eq!(t.timeout, Duration::from_secs(20));
        assert_eq!(t.connect_timeout, Duration::from_secs(5));
        assert_eq!(t.endpoint, cfg.endpoint);
    }

    #[test]
    fn curl_error_maps_to_transport_variant() {
        // Unsupported scheme fails inside curl without touching the network.
        let t = HttpTransport::new("notascheme://nowhere", Duration::from_secs(1), Duration::from_secs(1));
        let urls = vec![crate::normalize::normalize("example.com").unwrap()];
        match t.post_lookup(&urls) {
            Err(LookupError::Transport(_)) => {}
            other => panic!("expected transport error, got {:?}", other.map(|_| ())),
        }
    }
}
