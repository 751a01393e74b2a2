//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function sets up logging and routes the parsed CLI to
//! the matching handler: [`fetch`], [`env`], or [`probe`]. Each handler
//! lives in its own submodule.

pub mod env;
pub mod fetch;
pub mod probe;

use std::time::Duration;

use crate::cli::{Cli, Commands, ServiceArgs};
use crate::context::Context;
use crate::error::BootstrapError;
use crate::logging;

pub async fn dispatch(cli: Cli) -> Result<(), BootstrapError> {
    let Some(command) = cli.command else {
        print_welcome();
        return Ok(());
    };

    let log_format = logging::resolve_format(cli.log.pretty, cli.log.json_logs);
    logging::init(&cli.log.log_level, log_format);

    match command {
        Commands::Fetch(ref args) => fetch::execute(args).await,
        Commands::Env(ref args) => env::execute(args),
        Commands::Probe(ref args) => probe::execute(args).await,
    }
}

/// Context bounded by `--timeout`.
fn timeout_context(args: &ServiceArgs) -> Context {
    Context::background().with_timeout(Duration::from_millis(args.timeout))
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  sentry-bootstrap v{version} \u{2014} remote Sentry DSN resolution\n\n  \
         No command provided. To get started:\n\n    \
         sentry-bootstrap env                          Show resolved settings\n    \
         sentry-bootstrap fetch -s hub -v 1.0          Fetch the DSN for a service\n    \
         sentry-bootstrap --help                       See all commands and options\n"
    );
}
