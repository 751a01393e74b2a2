//! Retrying HTTP client built on the hyper legacy client.
//!
//! [`RetryClient::execute`] sends a [`RetryRequest`] up to
//! [`RetryPolicy::max_attempts`] times, racing each attempt and each
//! backoff sleep against the caller's [`Context`].

use std::time::Duration;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, Request, Response, Uri};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::context::Context;
use crate::error::BootstrapError;
use crate::retry::{is_permanent_transport_error, should_retry_status, RetryPolicy};

pub type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;
pub type HttpClient = Client<HttpsConnector, Full<Bytes>>;

#[must_use]
pub fn build_http_client() -> HttpClient {
    // rustls cannot pick a crypto provider on its own when several are
    // compiled in (sentry's reqwest may pull another one).
    let _ = rustls::crypto::ring::default_provider().install_default();

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(30))
        .build(https)
}

/// A request that can be rebuilt for every attempt.
#[derive(Debug, Clone)]
pub struct RetryRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl RetryRequest {
    pub fn new(method: Method, uri: &str) -> Result<Self, BootstrapError> {
        let uri: Uri = uri.parse().map_err(|e: http::uri::InvalidUri| BootstrapError::Request {
            source: Box::new(e),
        })?;

        match uri.scheme_str() {
            Some("http" | "https") => {}
            Some(other) => {
                return Err(BootstrapError::Request {
                    source: format!("unsupported protocol scheme \"{other}\"").into(),
                })
            }
            None => {
                return Err(BootstrapError::Request {
                    source: format!("missing protocol scheme in \"{uri}\"").into(),
                })
            }
        }
        if uri.authority().is_none() {
            return Err(BootstrapError::Request {
                source: format!("missing host in \"{uri}\"").into(),
            });
        }

        Ok(Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        })
    }

    pub fn post(uri: &str) -> Result<Self, BootstrapError> {
        Self::new(Method::POST, uri)
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub const fn uri(&self) -> &Uri {
        &self.uri
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    fn build(&self) -> Result<Request<Full<Bytes>>, BootstrapError> {
        let mut builder = Request::builder()
            .method(self.method.clone())
            .uri(self.uri.clone());
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        builder
            .body(Full::new(self.body.clone()))
            .map_err(|e| BootstrapError::Request {
                source: Box::new(e),
            })
    }
}

#[derive(Clone)]
pub struct RetryClient {
    client: HttpClient,
    policy: RetryPolicy,
}

impl RetryClient {
    #[must_use]
    pub fn new(client: HttpClient, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    #[must_use]
    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self::new(build_http_client(), policy)
    }

    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Sends `req`, retrying transient transport errors and retryable statuses.
    ///
    /// Any non-retryable response is returned as-is, whatever its status.
    /// A retryable status that survives the last attempt becomes
    /// [`BootstrapError::RetriesExhausted`].
    pub async fn execute(
        &self,
        ctx: &Context,
        req: &RetryRequest,
    ) -> Result<Response<Incoming>, BootstrapError> {
        if let Some(e) = ctx.err() {
            return Err(e);
        }

        let max_retries = self.policy.max_retries;
        let mut attempt: u32 = 0;

        loop {
            let request = req.build()?;

            let outcome = tokio::select! {
                biased;
                e = ctx.done() => return Err(e),
                result = self.client.request(request) => result,
            };

            let remaining = max_retries.saturating_sub(attempt);
            let wait = match outcome {
                Ok(response) => {
                    let status = response.status();
                    if !should_retry_status(status) {
                        return Ok(response);
                    }
                    if remaining == 0 {
                        return Err(BootstrapError::RetriesExhausted {
                            endpoint: req.uri.to_string(),
                            attempts: attempt + 1,
                            status,
                        });
                    }
                    let wait = self
                        .policy
                        .backoff
                        .wait(attempt, Some((status, response.headers())));
                    tracing::debug!(
                        method = %req.method,
                        endpoint = %req.uri,
                        status = status.as_u16(),
                        attempt,
                        wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                        remaining,
                        "retryable status, retrying"
                    );
                    // Release the connection before sleeping.
                    drop(response);
                    wait
                }
                Err(e) => {
                    if remaining == 0 || is_permanent_transport_error(&e) {
                        return Err(BootstrapError::Transport {
                            source: Box::new(e),
                        });
                    }
                    let wait = self.policy.backoff.wait(attempt, None);
                    tracing::debug!(
                        method = %req.method,
                        endpoint = %req.uri,
                        error = %e,
                        attempt,
                        wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                        remaining,
                        "request failed, retrying"
                    );
                    wait
                }
            };

            tokio::select! {
                biased;
                e = ctx.done() => return Err(e),
                () = tokio::time::sleep(wait) => {}
            }
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use http::header::CONTENT_TYPE;

    use super::*;

    #[test]
    fn post_accepts_http_and_https() {
        assert!(RetryRequest::post("https://api.kubeshark.co/sentry").is_ok());
        assert!(RetryRequest::post("http://local:9000/sentry").is_ok());
    }

    #[test]
    fn post_rejects_missing_or_unknown_scheme() {
        assert!(matches!(
            RetryRequest::post("local:9000/sentry"),
            Err(BootstrapError::Request { .. })
        ));
        assert!(matches!(
            RetryRequest::post("ftp://host/sentry"),
            Err(BootstrapError::Request { .. })
        ));
        assert!(matches!(
            RetryRequest::post("/sentry"),
            Err(BootstrapError::Request { .. })
        ));
    }

    #[test]
    fn post_rejects_unparseable_uri() {
        assert!(matches!(
            RetryRequest::post("http://exa mple.com/sentry"),
            Err(BootstrapError::Request { .. })
        ));
    }

    #[test]
    fn build_carries_headers_and_body() {
        let req = RetryRequest::post("http://host/sentry")
            .unwrap()
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body("{}");
        let built = req.build().unwrap();
        assert_eq!(built.method(), Method::POST);
        assert_eq!(built.uri(), "http://host/sentry");
        assert_eq!(built.headers()[CONTENT_TYPE], "application/json");
    }

    #[tokio::test]
    async fn cancelled_context_skips_request() {
        let (ctx, handle) = Context::with_cancel();
        handle.cancel();

        // Nothing listens on port 9 of a TEST-NET address; the request must never be sent.
        let req = RetryRequest::post("http://192.0.2.1:9/sentry").unwrap();
        let client = RetryClient::with_policy(RetryPolicy::default());
        let err = client.execute(&ctx, &req).await.unwrap_err();
        assert!(matches!(err, BootstrapError::Cancelled));
    }
}
