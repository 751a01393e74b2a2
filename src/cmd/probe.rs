//! `sentry-bootstrap probe` — run the full bootstrap and send one event.
//!
//! Useful to verify end-to-end that a service would report: the gate is
//! read, the DSN fetched, the client initialized, tags applied, and a
//! message captured and flushed.

use std::time::Duration;

use crate::bootstrap::{bootstrap, BootstrapOptions};
use crate::cli::ProbeArgs;
use crate::env::ProcessEnv;
use crate::error::BootstrapError;

const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn execute(args: &ProbeArgs) -> Result<(), BootstrapError> {
    let ctx = super::timeout_context(&args.service);
    let opts = BootstrapOptions {
        service: args.service.service.clone(),
        version: args.service.service_version.clone(),
        tags: args.tags.iter().cloned().collect(),
        transport: None,
    };

    let Some(guard) = bootstrap(&ProcessEnv, &ctx, &opts).await? else {
        println!("error tracking is not active for {}; no event sent", opts.service);
        return Ok(());
    };

    let event_id = sentry::capture_message(&args.message, sentry::Level::Info);
    let flushed = guard.flush(Some(FLUSH_TIMEOUT));
    if flushed {
        println!("\u{2713} sent event {event_id}");
    } else {
        tracing::warn!(event_id = %event_id, "event not flushed within {}s", FLUSH_TIMEOUT.as_secs());
    }

    Ok(())
}
