//! Transport collaborator: a single GET, no retries.
//!
//! Retry and backoff live in [`fetch`](crate::fetch); this layer only issues
//! one request, follows redirects and applies the per-attempt timeout.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use std::time::Duration;

use crate::config::DiscoveryConfig;
use crate::error::{ConfigError, TransportError};

/// Response from a GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Original requested URL.
    pub url: String,
    /// Final URL after redirects.
    pub final_url: String,
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues one GET and reports the raw outcome.
///
/// Non-2xx statuses are returned as a response, not an error; the fetcher
/// decides what counts as a failed attempt.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// reqwest-backed transport.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    /// HTTP/1.1-only fallback client for servers that reject HTTP/2.
    h1_client: reqwest::Client,
}

impl HttpClient {
    /// Fails on a config that `validate()` rejects or that reqwest cannot
    /// turn into a client.
    pub fn new(config: &DiscoveryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = Self::builder(config)?
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        let h1_client = Self::builder(config)?
            .http1_only()
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self { client, h1_client })
    }

    fn builder(config: &DiscoveryConfig) -> Result<reqwest::ClientBuilder, ConfigError> {
        let accept_language = HeaderValue::from_str(&config.accept_language)
            .map_err(|_| ConfigError::HeaderValue("accept_language"))?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, accept_language);

        Ok(reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(config.user_agent.clone())
            .default_headers(headers))
    }

    async fn get_with(
        &self,
        client: &reqwest::Client,
        url: &str,
    ) -> Result<HttpResponse, reqwest::Error> {
        let r = client.get(url).send().await?;
        let status = r.status().as_u16();
        let final_url = r.url().to_string();
        let body = r.text().await?;
        Ok(HttpResponse {
            url: url.to_string(),
            final_url,
            status,
            body,
        })
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        match self.get_with(&self.client, url).await {
            Ok(resp) => Ok(resp),
            Err(e) => {
                // Some CDNs reset HTTP/2 streams; give HTTP/1.1 one shot.
                let err_str = format!("{e}");
                if err_str.contains("http2")
                    || err_str.contains("protocol")
                    || err_str.contains("connection closed")
                {
                    tracing::debug!("retrying {url} over HTTP/1.1 after: {e}");
                    self.get_with(&self.h1_client, url)
                        .await
                        .map_err(TransportError::from)
                } else {
                    Err(e.into())
                }
            }
        }
    }
}
