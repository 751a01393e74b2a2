//! Retry policy for outbound requests.
//!
//! [`RetryPolicy`] holds the retry ceiling and an injected [`Backoff`]
//! strategy. [`should_retry_status`] decides which HTTP statuses count as
//! transient; [`is_permanent_transport_error`] singles out the transport
//! errors that another attempt cannot fix.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::header::RETRY_AFTER;
use http::HeaderMap;
use hyper::StatusCode;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_WAIT_MIN: Duration = Duration::from_secs(1);
pub const DEFAULT_WAIT_MAX: Duration = Duration::from_secs(30);

/// Computes how long to wait before the next attempt.
///
/// `attempt` is the zero-based index of the attempt that just failed.
/// `response` is present when that attempt produced an HTTP response.
pub trait Backoff: Send + Sync + fmt::Debug {
    fn wait(&self, attempt: u32, response: Option<(StatusCode, &HeaderMap)>) -> Duration;
}

/// `min * 2^attempt`, capped at `max`. A `Retry-After` header in seconds on
/// a 429 or 503 response takes precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    pub min: Duration,
    pub max: Duration,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            min: DEFAULT_WAIT_MIN,
            max: DEFAULT_WAIT_MAX,
        }
    }
}

impl Backoff for ExponentialBackoff {
    fn wait(&self, attempt: u32, response: Option<(StatusCode, &HeaderMap)>) -> Duration {
        if let Some(seconds) = response.and_then(|(status, headers)| retry_after(status, headers)) {
            return Duration::from_secs(seconds);
        }

        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.min.saturating_mul(factor).min(self.max)
    }
}

fn retry_after(status: StatusCode, headers: &HeaderMap) -> Option<u64> {
    if status != StatusCode::TOO_MANY_REQUESTS && status != StatusCode::SERVICE_UNAVAILABLE {
        return None;
    }
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[derive(Clone)]
pub struct RetryPolicy {
    /// Attempts allowed after the first one.
    pub max_retries: u32,
    pub backoff: Arc<dyn Backoff>,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, backoff: impl Backoff + 'static) -> Self {
        Self {
            max_retries,
            backoff: Arc::new(backoff),
        }
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, ExponentialBackoff::default())
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("backoff", &self.backoff)
            .finish()
    }
}

/// 429 and every 5xx except 501 are worth another attempt.
#[must_use]
pub fn should_retry_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || (status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED)
}

/// True when `err` was caused by TLS certificate verification. Everything
/// else on the transport side is retried.
#[must_use]
pub fn is_permanent_transport_error(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if is_certificate_error(e) {
            return true;
        }
        // io::Error::source skips the wrapped error itself.
        if let Some(inner) = e.downcast_ref::<std::io::Error>().and_then(std::io::Error::get_ref) {
            if is_permanent_transport_error(inner) {
                return true;
            }
        }
        current = e.source();
    }
    false
}

fn is_certificate_error(err: &(dyn StdError + 'static)) -> bool {
    matches!(
        err.downcast_ref::<rustls::Error>(),
        Some(rustls::Error::InvalidCertificate(_))
    )
}
