//! Sentry SDK initialization.
//!
//! Turns a fetched DSN string into a running client. The returned guard
//! must be held for the lifetime of the application so queued events are
//! flushed on drop.

use std::sync::Arc;

use sentry::{Hub, IntoDsn, TransportFactory};

use crate::error::BootstrapError;

/// `{service}@{version}`, the release name reported with every event.
#[must_use]
pub fn release_name(service: &str, version: &str) -> String {
    format!("{service}@{version}")
}

/// Starts the client and binds it to the process-wide main hub as well as
/// the calling thread's hub. `transport` overrides the SDK's HTTP transport.
pub fn init(
    dsn: &str,
    environment: &str,
    release: &str,
    transport: Option<Arc<dyn TransportFactory>>,
) -> Result<sentry::ClientInitGuard, BootstrapError> {
    let parsed_dsn = dsn.into_dsn().map_err(|e| BootstrapError::InvalidDsn {
        source: Box::new(e),
    })?;

    let guard = sentry::init(sentry::ClientOptions {
        dsn: parsed_dsn,
        environment: Some(environment.to_string().into()),
        release: Some(release.to_string().into()),
        transport,
        ..Default::default()
    });

    // sentry::init binds the calling thread's hub, which is the main hub
    // only when called from the main thread.
    let current = Hub::current();
    let main = Hub::main();
    if !Arc::ptr_eq(&current, &main) {
        main.bind_client(current.client());
    }

    Ok(guard)
}
