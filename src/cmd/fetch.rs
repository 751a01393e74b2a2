//! `sentry-bootstrap fetch` — ask the cloud API for a service's DSN.

use crate::cli::FetchArgs;
use crate::dsn::{DsnFetcher, FetchResponse};
use crate::env::ProcessEnv;
use crate::error::BootstrapError;

pub async fn execute(args: &FetchArgs) -> Result<(), BootstrapError> {
    let fetcher = DsnFetcher::from_env(&ProcessEnv);
    let ctx = super::timeout_context(&args.service);

    tracing::debug!(endpoint = %fetcher.endpoint(), service = %args.service.service, "fetching DSN");
    let dsn = fetcher
        .fetch(&ctx, &args.service.service, &args.service.service_version)
        .await?;

    if args.json {
        let out = serde_json::to_string(&FetchResponse { dsn }).map_err(BootstrapError::Serialize)?;
        println!("{out}");
    } else if dsn.is_empty() {
        println!("no DSN issued for {}", args.service.service);
    } else {
        println!("{dsn}");
    }

    Ok(())
}
