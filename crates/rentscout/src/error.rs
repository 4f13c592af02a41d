//! Error types for the discovery pipeline.
//!
//! Only [`DiscoveryError`] ever reaches a caller of `discover`. Transport and
//! search failures are recovered inside the pipeline and surface at most as
//! a [`SkipReason`](crate::types::SkipReason) in the report.

/// Caller-visible errors from a discovery request.
#[derive(thiserror::Error, Debug)]
pub enum DiscoveryError {
    #[error("Invalid input: {field} {reason}")]
    InvalidInput {
        field: &'static str,
        reason: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Rejected configuration values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("site_root is not an absolute http(s) URL: {0}")]
    SiteRoot(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{0} is not a valid HTTP header value")]
    HeaderValue(&'static str),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// A single failed attempt at the transport collaborator.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status {0}")]
    Status(u16),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => TransportError::Status(status.as_u16()),
            None => TransportError::Request(e.to_string()),
        }
    }
}

/// Failure of the search collaborator.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(String),

    #[error("search returned status {0}")]
    Status(u16),
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        SearchError::Request(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
