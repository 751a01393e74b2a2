//! In-process stand-in for the cloud API's `/sentry` endpoint.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use sentry_bootstrap::client::RetryClient;
use sentry_bootstrap::dsn::DsnFetcher;
use sentry_bootstrap::retry::{ExponentialBackoff, RetryPolicy};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub content_type: Option<String>,
    pub body: Bytes,
}

struct Shared {
    responses: Vec<(StatusCode, String)>,
    delay: Duration,
    hits: AtomicUsize,
    requests: Mutex<Vec<Recorded>>,
}

pub struct MockServer {
    pub addr: SocketAddr,
    shared: Arc<Shared>,
    shutdown: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockServer {
    /// Serves `responses` in order; the last one repeats once the list runs out.
    pub async fn start(responses: &[(u16, &str)]) -> Self {
        Self::start_with_delay(responses, Duration::ZERO).await
    }

    pub async fn start_with_delay(responses: &[(u16, &str)], delay: Duration) -> Self {
        assert!(!responses.is_empty());
        let shared = Arc::new(Shared {
            responses: responses
                .iter()
                .map(|(status, body)| (StatusCode::from_u16(*status).unwrap(), (*body).to_string()))
                .collect(),
            delay,
            hits: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        });

        let router = Router::new()
            .route("/sentry", post(handler))
            .with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shared,
            shutdown: Some(shutdown_tx),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn endpoint(&self) -> String {
        format!("{}/sentry", self.base_url())
    }

    pub fn hits(&self) -> usize {
        self.shared.hits.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.shared.requests.lock().unwrap().clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn handler(
    State(shared): State<Arc<Shared>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let idx = shared.hits.fetch_add(1, Ordering::SeqCst);
    shared.requests.lock().unwrap().push(Recorded {
        content_type: headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    if !shared.delay.is_zero() {
        tokio::time::sleep(shared.delay).await;
    }

    let (status, body) = &shared.responses[idx.min(shared.responses.len() - 1)];
    (*status, body.clone())
}

/// Millisecond backoff so retry tests stay fast.
pub fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(
        max_retries,
        ExponentialBackoff {
            min: Duration::from_millis(1),
            max: Duration::from_millis(5),
        },
    )
}

pub fn fetcher(endpoint: impl Into<String>, policy: RetryPolicy) -> DsnFetcher {
    DsnFetcher::new(RetryClient::with_policy(policy), endpoint)
}
