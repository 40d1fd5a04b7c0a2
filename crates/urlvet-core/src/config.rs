use crate::cache::DEFAULT_TTL_DAYS;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Lookup endpoint of the reputation service. The batch API is undocumented;
/// both the endpoint and the batch size come from empirical use.
const DEFAULT_ENDPOINT: &str = "https://sitereview.zscaler.com/api/lookup";

/// Largest batch the service has been observed to accept reliably.
const DEFAULT_BATCH_SIZE: usize = 90;

/// Per-request total timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Global configuration loaded from `~/.config/urlvet/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlvetConfig {
    /// Reputation service lookup endpoint (POST, JSON body).
    pub endpoint: String,
    /// Maximum URLs per outbound request.
    pub batch_size: usize,
    /// Days a cached verdict stays valid without re-lookup.
    pub ttl_days: u64,
    /// Total timeout per batch request, in seconds.
    pub timeout_secs: u64,
    /// Optional connect timeout in seconds (defaults to the total timeout).
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

impl Default for UrlvetConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            ttl_days: DEFAULT_TTL_DAYS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: None,
        }
    }
}

impl UrlvetConfig {
    pub fn ttl(&self) -> Duration {
        crate::cache::ttl_from_days(self.ttl_days)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.unwrap_or(self.timeout_secs))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("urlvet")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<UrlvetConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = UrlvetConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: UrlvetConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = UrlvetConfig::default();
        assert_eq!(cfg.batch_size, 90);
        assert_eq!(cfg.ttl_days, 14);
        assert_eq!(cfg.timeout_secs, 10);
        assert!(cfg.endpoint.starts_with("https://"));
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = UrlvetConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: UrlvetConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.endpoint, cfg.endpoint);
        assert_eq!(parsed.batch_size, cfg.batch_size);
        assert_eq!(parsed.ttl_days, cfg.ttl_days);
        assert_eq!(parsed.timeout_secs, cfg.timeout_secs);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            endpoint = "https://lookup.internal/api"
            batch_size = 25
            ttl_days = 7
            timeout_secs = 30
        "#;
        let cfg: UrlvetConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.endpoint, "https://lookup.internal/api");
        assert_eq!(cfg.batch_size, 25);
        assert_eq!(cfg.ttl(), Duration::from_secs(7 * 24 * 60 * 60));
        assert!(cfg.connect_timeout_secs.is_none());
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn config_toml_connect_timeout_override() {
        let toml = r#"
            endpoint = "https://lookup.internal/api"
            batch_size = 90
            ttl_days = 14
            timeout_secs = 10
            connect_timeout_secs = 5
        "#;
        let cfg: UrlvetConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(5));
    }
}
