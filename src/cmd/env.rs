//! `sentry-bootstrap env` — print the settings resolved from the environment.

use serde::{Deserialize, Serialize};

use crate::cli::EnvArgs;
use crate::env::{self, EnvSource, ProcessEnv};
use crate::error::BootstrapError;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnvReport {
    pub enabled: bool,
    pub environment: String,
    pub endpoint: String,
    pub build: String,
}

#[must_use]
pub fn report(source: &dyn EnvSource) -> EnvReport {
    EnvReport {
        enabled: env::is_enabled(source),
        environment: env::environment(source),
        endpoint: env::dsn_endpoint(source),
        build: env!("SENTRY_BOOTSTRAP_GIT_SHORT").to_string(),
    }
}

pub fn execute(args: &EnvArgs) -> Result<(), BootstrapError> {
    let report = report(&ProcessEnv);

    if args.json {
        let out = serde_json::to_string_pretty(&report).map_err(BootstrapError::Serialize)?;
        println!("{out}");
        return Ok(());
    }

    let state = if report.enabled { "enabled" } else { "disabled" };
    println!("  reporting:    {state}");
    println!("  environment:  {}", report.environment);
    println!("  endpoint:     {}", report.endpoint);
    println!("  build:        {}", report.build);
    Ok(())
}
