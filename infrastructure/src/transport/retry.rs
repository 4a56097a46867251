//! Retry policy for the completion transport.
//!
//! Pure decision logic: which failures are retried and how long to wait.
//! The retry loop itself lives in [`super::OpenAiTransport`].

use std::time::Duration;

use warden_application::TransportError;

use crate::config::FileTransportConfig;

/// Upper bound on a server-requested wait.
pub const MAX_SERVER_WAIT: Duration = Duration::from_secs(60);

/// A failed attempt that may succeed if repeated.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryableFailure {
    /// HTTP 429
    RateLimited,
    /// HTTP 503, with the wait the server asked for, if any
    Unavailable { server_wait: Option<Duration> },
    /// The request did not complete within the timeout
    Timeout,
}

impl RetryableFailure {
    /// Error reported once every attempt has failed.
    pub fn exhausted(&self, attempts: u32) -> TransportError {
        match self {
            Self::RateLimited => TransportError::RateLimited { attempts },
            Self::Unavailable { .. } => TransportError::Unavailable { attempts },
            Self::Timeout => TransportError::Timeout { attempts },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FileTransportConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(config: &FileTransportConfig) -> Self {
        Self::new(config.max_retries, config.retry_delay())
    }

    /// Whether another attempt follows the failed attempt `attempt` (0-indexed).
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }

    /// Wait before the attempt following failed attempt `attempt` (0-indexed).
    ///
    /// - 429: `base × 2^attempt`
    /// - 503: the server's wait, capped at [`MAX_SERVER_WAIT`], else `base`
    /// - timeout: `base × (attempt + 1)`
    pub fn delay(&self, failure: &RetryableFailure, attempt: u32) -> Duration {
        match failure {
            RetryableFailure::RateLimited => self
                .base_delay
                .saturating_mul(2u32.saturating_pow(attempt)),
            RetryableFailure::Unavailable { server_wait } => server_wait
                .unwrap_or(self.base_delay)
                .min(MAX_SERVER_WAIT),
            RetryableFailure::Timeout => self.base_delay.saturating_mul(attempt.saturating_add(1)),
        }
    }
}

/// Wait requested by a 503 response.
///
/// Prefers an `estimated_time` field (seconds) in a JSON body, then a
/// numeric `Retry-After` header.
pub fn server_wait(body: &str, retry_after: Option<&str>) -> Option<Duration> {
    let from_body = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("estimated_time").and_then(|t| t.as_f64()));
    let from_header = retry_after.and_then(|h| h.trim().parse::<f64>().ok());

    from_body
        .or(from_header)
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| Duration::from_secs_f64(secs.min(MAX_SERVER_WAIT.as_secs_f64())))
}
