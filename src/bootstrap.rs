//! Startup wiring: gate, fetch, init, tag.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use sentry::{Hub, TransportFactory};

use crate::context::Context;
use crate::dsn::DsnFetcher;
use crate::env::{self, EnvSource};
use crate::error::BootstrapError;
use crate::sentry_integration;
use crate::tags::{apply_tags, SentryScope};

#[derive(Clone, Default)]
pub struct BootstrapOptions {
    pub service: String,
    pub version: String,
    pub tags: HashMap<String, String>,
    /// Replaces the SDK's HTTP transport when set.
    pub transport: Option<Arc<dyn TransportFactory>>,
}

impl fmt::Debug for BootstrapOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapOptions")
            .field("service", &self.service)
            .field("version", &self.version)
            .field("tags", &self.tags)
            .field("transport", &self.transport.is_some())
            .finish()
    }
}

/// Brings up Sentry for a service when reporting is enabled and the cloud
/// API hands out a DSN for it.
///
/// Returns `Ok(None)` when the gate is off or no DSN is available; the
/// caller keeps running without error tracking in both cases.
pub async fn bootstrap(
    env: &dyn EnvSource,
    ctx: &Context,
    opts: &BootstrapOptions,
) -> Result<Option<sentry::ClientInitGuard>, BootstrapError> {
    bootstrap_with(env, &DsnFetcher::from_env(env), ctx, opts).await
}

/// [`bootstrap`] with an explicit fetcher.
pub async fn bootstrap_with(
    env: &dyn EnvSource,
    fetcher: &DsnFetcher,
    ctx: &Context,
    opts: &BootstrapOptions,
) -> Result<Option<sentry::ClientInitGuard>, BootstrapError> {
    if !env::is_enabled(env) {
        tracing::debug!("error reporting disabled, skipping Sentry setup");
        return Ok(None);
    }

    let dsn = fetcher.fetch(ctx, &opts.service, &opts.version).await?;
    if dsn.is_empty() {
        tracing::info!(
            service = %opts.service,
            endpoint = %fetcher.endpoint(),
            "no DSN issued, error tracking disabled"
        );
        return Ok(None);
    }

    let environment = env::environment(env);
    let release = sentry_integration::release_name(&opts.service, &opts.version);
    let guard =
        sentry_integration::init(&dsn, &environment, &release, opts.transport.clone())?;

    // The calling thread's hub is a fork of the main hub taken before these
    // tags existed, so it needs them too.
    let main = SentryScope::main();
    apply_tags(&main, &opts.tags);
    let current = Hub::current();
    if !Arc::ptr_eq(&current, main.hub()) {
        apply_tags(&SentryScope::new(current), &opts.tags);
    }

    tracing::info!(
        service = %opts.service,
        environment = %environment,
        release = %release,
        "error tracking enabled"
    );
    Ok(Some(guard))
}
