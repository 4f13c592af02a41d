//! Shared fixtures for discovery integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use rentscout::{DiscoveryConfig, HttpResponse, SearchError, SearchHit, SearchProvider, Transport, TransportError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config pointed at `root` with millisecond backoff.
pub fn fast_config(root: &str) -> DiscoveryConfig {
    DiscoveryConfig {
        site_root: root.trim_end_matches('/').to_string(),
        base_backoff_ms: 1,
        request_timeout_ms: 5_000,
        ..Default::default()
    }
}

pub fn html_page(title: &str, body: &str) -> String {
    format!("<html><head><title>{title}</title></head><body>{body}</body></html>")
}

pub fn links_page(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|h| format!(r#"<li><a href="{h}">listing</a></li>"#))
        .collect();
    html_page("Rentals", &format!("<ul>{anchors}</ul>"))
}

/// Serve `body` with 200 at `url_path`, expecting exactly `times` hits.
pub async fn mount_page(server: &MockServer, url_path: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.to_string())
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// Assert that `url_path` is never requested.
pub async fn forbid_path(server: &MockServer, url_path: &str) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

/// DuckDuckGo-style redirect wrapper around `target`.
pub fn ddg_wrap(target: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("//duckduckgo.com/l/?uddg={encoded}&rut=0")
}

/// Search collaborator returning a fixed hit list and recording queries.
pub struct StubSearch {
    hits: Vec<SearchHit>,
    pub queries: Mutex<Vec<(String, usize)>>,
}

impl StubSearch {
    pub fn new(hits: Vec<(&str, &str)>) -> Self {
        Self {
            hits: hits
                .into_iter()
                .map(|(href, title)| SearchHit {
                    href: href.to_string(),
                    title: title.to_string(),
                })
                .collect(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchProvider for StubSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), max_results));
        Ok(self.hits.iter().take(max_results).cloned().collect())
    }
}

/// In-memory site: fixed pages with per-page latency, tracking peak
/// concurrent requests.
#[derive(Default)]
pub struct SlowSite {
    pages: HashMap<String, (String, Duration)>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    requests: AtomicUsize,
}

impl SlowSite {
    pub fn page(mut self, url: &str, body: String, delay: Duration) -> Self {
        self.pages.insert(url.to_string(), (body, delay));
        self
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for SlowSite {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let (status, body, delay) = match self.pages.get(url) {
            Some((body, delay)) => (200, body.clone(), *delay),
            None => (404, String::new(), Duration::from_millis(1)),
        };
        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(HttpResponse {
            url: url.to_string(),
            final_url: url.to_string(),
            status,
            body,
        })
    }
}
