//! Bounded automatic retries for index requests
//!
//! A [RetryPolicy] is built once from [RetryConfig] and attached to the
//! session; every request the session sends goes through [RetryPolicy::execute].

use crate::config::RetryConfig;
use reqwest::{Client, Method, Request, Response, StatusCode};
use std::time::Duration;

/// Upper bound on the delay between two attempts
pub const MAX_BACKOFF: Duration = Duration::from_secs(120);

/// Retry settings applied uniformly to every request of a session
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_factor: f64,
    retry_statuses: Vec<StatusCode>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Build the policy from configuration; unknown status codes are dropped.
    pub fn from_config(config: &RetryConfig) -> Self {
        RetryPolicy {
            max_attempts: config.max_attempts.max(1),
            backoff_factor: config.backoff_factor.max(0.0),
            retry_statuses: config
                .retry_statuses
                .iter()
                .filter_map(|code| StatusCode::from_u16(*code).ok())
                .collect(),
        }
    }

    /// Total number of attempts, including the first one
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `retry` (1-based): `backoff_factor * 2^(retry-1)` seconds,
    /// capped at [MAX_BACKOFF].
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16) as i32;
        Duration::try_from_secs_f64(self.backoff_factor * 2f64.powi(exponent))
            .map_or(MAX_BACKOFF, |delay| delay.min(MAX_BACKOFF))
    }

    /// Whether a response status on this method warrants another attempt.
    ///
    /// Only idempotent methods are retried on status, so a form submission that
    /// reached the index is never replayed.
    pub fn retries_status(&self, method: &Method, status: StatusCode) -> bool {
        is_idempotent(method) && self.retry_statuses.contains(&status)
    }

    /// Whether a transport error on this method warrants another attempt.
    pub fn retries_error(&self, method: &Method, error: &reqwest::Error) -> bool {
        error.is_connect() || (is_idempotent(method) && error.is_timeout())
    }

    /// Send `request`, retrying according to the policy.
    ///
    /// The final attempt's outcome is returned as-is, including a response with
    /// a retryable status; callers decide what a non-success status means.
    pub async fn execute(&self, client: &Client, request: Request) -> reqwest::Result<Response> {
        let method = request.method().clone();
        let url = request.url().clone();
        let mut attempt = 1;

        loop {
            let current = if attempt < self.max_attempts {
                request.try_clone()
            } else {
                None
            };
            let Some(current) = current else {
                return client.execute(request).await;
            };

            match client.execute(current).await {
                Ok(response) if self.retries_status(&method, response.status()) => {
                    tracing::warn!(
                        "{} {} returned {} (attempt {}/{}), retrying",
                        method,
                        url,
                        response.status(),
                        attempt,
                        self.max_attempts
                    );
                }
                Ok(response) => return Ok(response),
                Err(err) if self.retries_error(&method, &err) => {
                    tracing::warn!(
                        "{} {} failed: {} (attempt {}/{}), retrying",
                        method,
                        url,
                        err,
                        attempt,
                        self.max_attempts
                    );
                }
                Err(err) => return Err(err),
            }

            tokio::time::sleep(self.backoff(attempt)).await;
            attempt += 1;
        }
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::PUT | Method::DELETE | Method::TRACE
    )
}
