//! Bounded retry with linear backoff around the transport collaborator.

use std::time::Duration;

use crate::error::TransportError;
use crate::http_client::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Ok,
    Failed(String),
}

/// Result of [`fetch_with_retry`]. Never an error: a failed fetch is simply
/// "no signal" for its URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub url: String,
    /// Page body on success, empty otherwise.
    pub body: String,
    pub status: FetchStatus,
    pub attempts: u32,
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        self.status == FetchStatus::Ok
    }
}

/// GET `url` up to `max_attempts` times.
///
/// Transport errors and non-2xx statuses both fail an attempt. After failed
/// attempt `n` (and only if another attempt remains) the task sleeps
/// `base_backoff * n` on the tokio timer, so other in-flight fetches keep
/// running. `max_attempts` of zero is treated as one.
pub async fn fetch_with_retry(
    transport: &dyn Transport,
    url: &str,
    max_attempts: u32,
    base_backoff: Duration,
) -> FetchOutcome {
    let max_attempts = max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        let err = match transport.get(url).await {
            Ok(resp) if resp.is_success() => {
                return FetchOutcome {
                    url: url.to_string(),
                    body: resp.body,
                    status: FetchStatus::Ok,
                    attempts: attempt,
                };
            }
            Ok(resp) => TransportError::Status(resp.status),
            Err(e) => e,
        };

        tracing::debug!("fetch {url} attempt {attempt}/{max_attempts} failed: {err}");
        last_error = err.to_string();

        if attempt < max_attempts {
            tokio::time::sleep(base_backoff * attempt).await;
        }
    }

    FetchOutcome {
        url: url.to_string(),
        body: String::new(),
        status: FetchStatus::Failed(last_error),
        attempts: max_attempts,
    }
}
