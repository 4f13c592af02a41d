//! Fallback search: the search collaborator and the adapter that turns its
//! hits into candidate listing URLs.
//!
//! [`SearchProvider`] is the abstract collaborator. [`DuckDuckGoSearch`]
//! implements it by scraping the DuckDuckGo HTML endpoint, which needs no
//! API key. [`fallback_candidates`] is the adapter: one `site:` query,
//! redirect unwrapping, listing-shape and category filtering.

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;

use crate::config::DiscoveryConfig;
use crate::error::{ConfigError, SearchError};
use crate::types::SocietyQuery;
use crate::validate::is_bad_listing;

pub const DUCKDUCKGO_HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// Query parameters that redirect wrappers use to carry the real target.
const REDIRECT_PARAMS: &[&str] = &["uddg", "url", "q"];

/// One organic search result, in relevance order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub href: String,
    pub title: String,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError>;
}

/// Scrapes `html.duckduckgo.com` result anchors.
#[derive(Clone)]
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(config: &DiscoveryConfig) -> Result<Self, ConfigError> {
        Self::with_endpoint(config, DUCKDUCKGO_HTML_ENDPOINT)
    }

    /// Point at a different endpoint (a mirror, or a mock server in tests).
    pub fn with_endpoint(config: &DiscoveryConfig, endpoint: &str) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .header("Accept", "text/html")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SearchError::Status(resp.status().as_u16()));
        }

        let body = resp.text().await?;
        Ok(parse_duckduckgo_results(&body, max_results))
    }
}

/// Result anchors from a DuckDuckGo HTML results page, document order.
pub fn parse_duckduckgo_results(body: &str, max_results: usize) -> Vec<SearchHit> {
    let doc = Html::parse_document(body);
    let link_sel = Selector::parse("a.result__a").expect("result selector is valid");

    doc.select(&link_sel)
        .filter_map(|el| {
            let href = el.value().attr("href")?.trim();
            if href.is_empty() {
                return None;
            }
            let title = el.text().collect::<Vec<_>>().join(" ");
            Some(SearchHit {
                href: href.to_string(),
                title: title.split_whitespace().collect::<Vec<_>>().join(" "),
            })
        })
        .take(max_results)
        .collect()
}

/// Recover the destination of a search-engine redirect link.
///
/// Handles protocol-relative hrefs such as
/// `//duckduckgo.com/l/?uddg=https%3A%2F%2Fsite%2Fproperty%2F...&rut=...`.
/// Anything that is not a wrapper is returned unchanged.
pub fn unwrap_redirect(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };

    let Ok(parsed) = url::Url::parse(&absolute) else {
        return href.to_string();
    };

    for key in REDIRECT_PARAMS {
        if let Some((_, value)) = parsed.query_pairs().find(|(k, _)| k == *key) {
            if value.starts_with("http://") || value.starts_with("https://") {
                return value.into_owned();
            }
        }
    }
    absolute
}

/// True when `url` is on the primary source and looks like a listing page.
pub fn is_listing_shape(url: &str, config: &DiscoveryConfig) -> bool {
    let Ok(parsed) = url::Url::parse(url) else {
        return false;
    };
    let domain = config.primary_domain();
    let host_ok = parsed
        .host_str()
        .map(|h| {
            let h = h.to_ascii_lowercase();
            h == domain || h.ends_with(&format!(".{domain}"))
        })
        .unwrap_or(false);
    host_ok && parsed.path().contains(config.property_marker.as_str())
}

pub fn fallback_query(query: &SocietyQuery, config: &DiscoveryConfig) -> String {
    format!(
        "{} {} for rent site:{}",
        query.society_name,
        query.city,
        config.primary_domain()
    )
}

/// Candidate listing URLs from the search collaborator, relevance order.
///
/// A failing search is logged and treated as zero results.
pub async fn fallback_candidates(
    provider: &dyn SearchProvider,
    query: &SocietyQuery,
    config: &DiscoveryConfig,
) -> Vec<String> {
    let q = fallback_query(query, config);
    let hits = match provider.search(&q, config.search_max_results).await {
        Ok(hits) => hits,
        Err(e) => {
            tracing::warn!("fallback search failed for {q:?}: {e}");
            return Vec::new();
        }
    };

    let total = hits.len();
    let urls: Vec<String> = hits
        .into_iter()
        .filter_map(|hit| {
            let url = unwrap_redirect(&hit.href);
            if !is_listing_shape(&url, config) {
                tracing::debug!("search hit off-shape: {url}");
                return None;
            }
            if is_bad_listing(&url, &hit.title) {
                tracing::debug!("search hit blocked: {url}");
                return None;
            }
            Some(url)
        })
        .collect();

    tracing::info!("fallback search {q:?}: {} of {total} hits usable", urls.len());
    urls
}
