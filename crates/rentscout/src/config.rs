//! Pipeline configuration and environment overrides.

use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_SITE_ROOT: &str = "https://www.nobroker.in";
pub const DEFAULT_LISTINGS_PATH: &str = "rent/society";
pub const DEFAULT_PROPERTY_MARKER: &str = "/property/";

/// Price token embedded in listing-detail URLs, e.g. `.../for-rs-32,000`.
pub const PRICE_MARKER: &str = "for-rs-";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/120.0.0.0 Safari/537.36";

/// Tunables for one [`Discoverer`](crate::discovery::Discoverer).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Root of the primary source. Relative listing hrefs resolve against it.
    pub site_root: String,
    /// Canonical listings path under the root that probe URLs hang off.
    pub listings_path: String,
    /// Path marker identifying a listing-detail URL.
    pub property_marker: String,
    /// Total GET attempts per URL (1 initial + retries).
    pub max_attempts: u32,
    /// Linear backoff unit; attempt `n` is followed by a `n * unit` sleep.
    pub base_backoff_ms: u64,
    /// Per-attempt transport timeout.
    pub request_timeout_ms: u64,
    /// Upper bound on in-flight listing-page fetches while mining.
    pub mining_concurrency: usize,
    /// Result cap requested from the search collaborator.
    pub search_max_results: usize,
    pub user_agent: String,
    pub accept_language: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            site_root: DEFAULT_SITE_ROOT.to_string(),
            listings_path: DEFAULT_LISTINGS_PATH.to_string(),
            property_marker: DEFAULT_PROPERTY_MARKER.to_string(),
            max_attempts: 3,
            base_backoff_ms: 500,
            request_timeout_ms: 15_000,
            mining_concurrency: 6,
            search_max_results: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

impl DiscoveryConfig {
    /// Defaults overridden by `RENTSCOUT_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("RENTSCOUT_SITE_ROOT") {
            cfg.site_root = v.trim().trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("RENTSCOUT_LISTINGS_PATH") {
            cfg.listings_path = v.trim().trim_matches('/').to_string();
        }
        if let Some(v) = lookup("RENTSCOUT_USER_AGENT") {
            cfg.user_agent = v;
        }

        override_num(&lookup, "RENTSCOUT_MAX_ATTEMPTS", &mut cfg.max_attempts);
        override_num(&lookup, "RENTSCOUT_BACKOFF_MS", &mut cfg.base_backoff_ms);
        override_num(&lookup, "RENTSCOUT_TIMEOUT_MS", &mut cfg.request_timeout_ms);
        override_num(&lookup, "RENTSCOUT_CONCURRENCY", &mut cfg.mining_concurrency);
        override_num(&lookup, "RENTSCOUT_SEARCH_MAX", &mut cfg.search_max_results);

        cfg
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Zero("max_attempts"));
        }
        if self.mining_concurrency == 0 {
            return Err(ConfigError::Zero("mining_concurrency"));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Zero("request_timeout_ms"));
        }
        if HeaderValue::from_str(&self.user_agent).is_err() {
            return Err(ConfigError::HeaderValue("user_agent"));
        }
        if HeaderValue::from_str(&self.accept_language).is_err() {
            return Err(ConfigError::HeaderValue("accept_language"));
        }
        match url::Url::parse(&self.site_root) {
            Ok(u) if matches!(u.scheme(), "http" | "https") && u.host_str().is_some() => Ok(()),
            _ => Err(ConfigError::SiteRoot(self.site_root.clone())),
        }
    }

    /// Host of the primary source with any leading `www.` stripped.
    ///
    /// Used for the `site:` search restriction and for matching search hits.
    pub fn primary_domain(&self) -> String {
        url::Url::parse(&self.site_root)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
            .map(|h| h.trim_start_matches("www.").to_string())
            .unwrap_or_default()
    }

    pub fn base_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn override_num<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(v) => *slot = v,
        Err(_) => tracing::warn!("ignoring unparseable {key}={raw:?}, keeping default"),
    }
}
