//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (fetch, env, probe), and their argument structs.

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "sentry-bootstrap",
    version,
    about = "Remote Sentry DSN resolution and scope bootstrap",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        sentry-bootstrap env                                   Show resolved settings\n  \
        sentry-bootstrap fetch -s hub -v v52.3.0               Ask the cloud API for a DSN\n  \
        SENTRY_ENABLED=true sentry-bootstrap probe -s hub -v 1  Send a test event"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the DSN issued for a service
    Fetch(FetchArgs),

    /// Show the settings resolved from the environment
    Env(EnvArgs),

    /// Bootstrap Sentry and capture a test event
    Probe(ProbeArgs),
}

#[derive(Args)]
pub struct LogArgs {
    /// Log level
    #[arg(short, long, global = true, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, global = true, conflicts_with = "pretty")]
    pub json_logs: bool,
}

#[derive(Args)]
pub struct ServiceArgs {
    /// Service name sent to the cloud API
    #[arg(short, long)]
    pub service: String,

    /// Service version sent to the cloud API
    #[arg(short = 'v', long)]
    pub service_version: String,

    /// Give up after this many milliseconds, retries included
    #[arg(long, env = "FETCH_TIMEOUT_MS", default_value_t = 10_000)]
    pub timeout: u64,
}

#[derive(Args)]
pub struct FetchArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct EnvArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        sentry-bootstrap probe -s hub -v 1 -t cluster=prod-eu     Tag the event\n  \
        sentry-bootstrap probe -s worker -v 1 -m \"hello\"          Custom message")]
pub struct ProbeArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// Scope tag as key=value (repeatable; empty values are skipped)
    #[arg(short, long = "tag", value_parser = parse_tag)]
    pub tags: Vec<(String, String)>,

    /// Message sent as the test event
    #[arg(short, long, default_value = "sentry-bootstrap probe")]
    pub message: String,
}

fn parse_tag(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_splits_on_first_equals() {
        assert_eq!(
            parse_tag("url=http://a/b?c=d").unwrap(),
            ("url".to_string(), "http://a/b?c=d".to_string())
        );
    }

    #[test]
    fn tag_allows_empty_value() {
        assert_eq!(parse_tag("zone=").unwrap(), ("zone".to_string(), String::new()));
    }

    #[test]
    fn tag_requires_key_and_separator() {
        assert!(parse_tag("novalue").is_err());
        assert!(parse_tag("=x").is_err());
    }

    #[test]
    fn probe_parses_repeated_tags() {
        let cli = Cli::try_parse_from([
            "sentry-bootstrap",
            "probe",
            "-s",
            "hub",
            "-v",
            "1.0",
            "-t",
            "a=1",
            "--tag",
            "b=",
        ])
        .unwrap();
        let Some(Commands::Probe(args)) = cli.command else {
            panic!("expected probe");
        };
        assert_eq!(args.service.service, "hub");
        assert_eq!(args.service.service_version, "1.0");
        assert_eq!(args.tags.len(), 2);
    }

    #[test]
    fn fetch_accepts_long_service_version() {
        let cli = Cli::try_parse_from([
            "sentry-bootstrap",
            "fetch",
            "--service",
            "worker",
            "--service-version",
            "v52.3.0",
            "--json",
        ])
        .unwrap();
        let Some(Commands::Fetch(args)) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(args.service.service, "worker");
        assert_eq!(args.service.service_version, "v52.3.0");
        assert!(args.json);
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
