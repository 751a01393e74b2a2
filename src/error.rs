//! Unified error type for sentry-bootstrap.
//!
//! [`BootstrapError`] covers every failure a DSN fetch or Sentry
//! bootstrap can surface. A non-200 answer from the configuration
//! service is deliberately not represented here: it maps to an empty
//! DSN instead.

use hyper::StatusCode;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BootstrapError {
    #[error("error marshalling request body: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("error creating POST request: {source}")]
    Request {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("error making POST request: {source}")]
    Transport {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("POST {endpoint} giving up after {attempts} attempt(s) (last status {status})")]
    RetriesExhausted {
        endpoint: String,
        attempts: u32,
        status: StatusCode,
    },

    #[error("error reading response body: {source}")]
    ReadBody {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("error unmarshalling response body: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("context cancelled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error("invalid Sentry DSN: {source}")]
    InvalidDsn {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl BootstrapError {
    /// True for the two ways a [`Context`](crate::context::Context) can end a call.
    #[must_use]
    pub const fn is_context_error(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}
