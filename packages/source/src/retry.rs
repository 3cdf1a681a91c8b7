//! HTTP retry helpers for transient errors.
//!
//! Document downloads go through [`send_bytes`] instead of calling
//! `reqwest::RequestBuilder::send()` directly, so every request gets
//! automatic retry with exponential backoff for transient failures
//! (timeouts, connection resets, server errors, rate limiting).
//!
//! ```ignore
//! let bytes = retry::send_bytes(|| client.get(url), &RetryPolicy::default()).await?;
//! ```

use std::time::Duration;

use crate::SourceError;

/// How many times and how patiently to retry a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on each further retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    /// 3 retries waiting 2s, 4s, 8s.
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// A policy that gives up after the first failure.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Backoff before retry number `attempt` (1-based).
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(1u32 << attempt.saturating_sub(1).min(16))
    }
}

/// What to do with a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Accept,
    /// 429 and 5xx.
    Retry,
    /// Any other 4xx; permanent.
    Fail,
}

/// Classifies a response status for the retry loop.
#[must_use]
pub fn classify_status(status: reqwest::StatusCode) -> StatusAction {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        StatusAction::Retry
    } else if status.is_client_error() {
        StatusAction::Fail
    } else {
        StatusAction::Accept
    }
}

/// Sends an HTTP request and returns the response body bytes.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`] (builders are consumed by `.send()`).
/// A body that fails mid-read is re-fetched under the same policy.
///
/// # Errors
///
/// Returns [`SourceError`] if the request fails after all retries or the
/// server returns a non-retryable status code.
#[allow(clippy::future_not_send)]
pub async fn send_bytes<F>(build_request: F, policy: &RetryPolicy) -> Result<Vec<u8>, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut body_attempt = 0;
    loop {
        let response = send_inner(&build_request, policy).await?;
        let url = response.url().to_string();

        match response.bytes().await {
            Ok(bytes) => return Ok(bytes.to_vec()),
            Err(e) if body_attempt < policy.max_retries => {
                body_attempt += 1;
                let delay = policy.delay(body_attempt);
                log::warn!(
                    "Body read failed (body retry {body_attempt}/{}), re-fetching in {delay:?}...\n  \
                     url: {url}\n  \
                     error: {e}",
                    policy.max_retries
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                log::error!("Body read failed after {body_attempt} retries, giving up: {url}: {e}");
                return Err(SourceError::Http(e));
            }
        }
    }
}

/// Sends the request built by `build_request`, retrying on transient
/// errors with exponential backoff. Returns the first 2xx/3xx response.
#[allow(clippy::future_not_send)]
async fn send_inner<F>(
    build_request: &F,
    policy: &RetryPolicy,
) -> Result<reqwest::Response, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let max_retries = policy.max_retries;
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = policy.delay(attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    attempt += 1;
                    continue;
                }
                return Err(SourceError::Http(e));
            }
            Ok(response) => {
                let status = response.status();
                match classify_status(status) {
                    StatusAction::Accept => return Ok(response),
                    StatusAction::Retry if attempt < max_retries => {
                        log::warn!("  HTTP {status} from {}", response.url());
                        attempt += 1;
                    }
                    StatusAction::Retry | StatusAction::Fail => {
                        return Err(SourceError::Status {
                            url: response.url().to_string(),
                            status: status.as_u16(),
                        });
                    }
                }
            }
        }
    }
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_decode() || e.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(1), Duration::from_secs(2));
        assert_eq!(policy.delay(2), Duration::from_secs(4));
        assert_eq!(policy.delay(3), Duration::from_secs(8));
    }

    #[test]
    fn classifies_statuses() {
        use reqwest::StatusCode;

        assert_eq!(classify_status(StatusCode::OK), StatusAction::Accept);
        assert_eq!(classify_status(StatusCode::FOUND), StatusAction::Accept);
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            StatusAction::Retry
        );
        assert_eq!(
            classify_status(StatusCode::BAD_GATEWAY),
            StatusAction::Retry
        );
        assert_eq!(classify_status(StatusCode::NOT_FOUND), StatusAction::Fail);
        assert_eq!(classify_status(StatusCode::FORBIDDEN), StatusAction::Fail);
    }

    #[tokio::test]
    async fn unreachable_host_fails_without_retry_policy() {
        let client = reqwest::Client::new();
        let err = send_bytes(|| client.get("http://127.0.0.1:9/missing.pdf"), &RetryPolicy::none())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Http(_)));
    }
}
