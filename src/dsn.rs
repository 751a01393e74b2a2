//! DSN lookup against the cloud configuration service.
//!
//! Posts `{"service", "version"}` to `{KUBESHARK_CLOUD_API_URL}/sentry`
//! and reads `{"dsn"}` back. Any non-200 answer means "no DSN for this
//! caller" and yields an empty string rather than an error.

use http::header::{HeaderValue, CONTENT_TYPE};
use http_body_util::BodyExt;
use hyper::StatusCode;
use serde::{Deserialize, Serialize};

use crate::client::{RetryClient, RetryRequest};
use crate::context::Context;
use crate::env::{self, EnvSource};
use crate::error::BootstrapError;
use crate::retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest<'a> {
    pub service: &'a str,
    pub version: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResponse {
    pub dsn: String,
}

#[derive(Clone)]
pub struct DsnFetcher {
    client: RetryClient,
    endpoint: String,
}

impl DsnFetcher {
    #[must_use]
    pub fn new(client: RetryClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// A fetcher aimed at the endpoint named by `env`, using the default retry policy.
    #[must_use]
    pub fn from_env(env: &dyn EnvSource) -> Self {
        Self::new(
            RetryClient::with_policy(RetryPolicy::default()),
            env::dsn_endpoint(env),
        )
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn fetch(
        &self,
        ctx: &Context,
        service: &str,
        version: &str,
    ) -> Result<String, BootstrapError> {
        let body = serde_json::to_vec(&FetchRequest { service, version })
            .map_err(BootstrapError::Serialize)?;

        let request = RetryRequest::post(&self.endpoint)?
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body);

        let response = self.client.execute(ctx, &request).await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!(endpoint = %self.endpoint, status = status.as_u16(), "no DSN available");
            return Ok(String::new());
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| BootstrapError::ReadBody {
                source: Box::new(e),
            })?
            .to_bytes();

        let parsed: FetchResponse =
            serde_json::from_slice(&body).map_err(BootstrapError::Deserialize)?;
        Ok(parsed.dsn)
    }
}

/// One-shot fetch using the endpoint and defaults derived from `env`.
pub async fn fetch_dsn(
    env: &dyn EnvSource,
    ctx: &Context,
    service: &str,
    version: &str,
) -> Result<String, BootstrapError> {
    DsnFetcher::from_env(env).fetch(ctx, service, version).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_shape() {
        let json = serde_json::to_value(FetchRequest {
            service: "hub",
            version: "v52.3.0",
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"service": "hub", "version": "v52.3.0"}));
    }

    #[test]
    fn response_ignores_extra_fields() {
        let parsed: FetchResponse =
            serde_json::from_str(r#"{"dsn":"https://k@o1.ingest.sentry.io/2","extra":1}"#).unwrap();
        assert_eq!(parsed.dsn, "https://k@o1.ingest.sentry.io/2");
    }

    #[test]
    fn response_requires_dsn() {
        assert!(serde_json::from_str::<FetchResponse>("{}").is_err());
    }

    #[tokio::test]
    async fn from_env_targets_override() {
        let env = env::MapEnv::new().with(env::CLOUD_API_URL, "http://local:9000");
        assert_eq!(DsnFetcher::from_env(&env).endpoint(), "http://local:9000/sentry");
    }

    #[tokio::test]
    async fn from_env_targets_production_by_default() {
        let env = env::MapEnv::new();
        assert_eq!(
            DsnFetcher::from_env(&env).endpoint(),
            "https://api.kubeshark.co/sentry"
        );
    }
}
