//! sentry-bootstrap resolves a Sentry DSN from the cloud configuration
//! service and brings up error tracking for a service.
//!
//! Reporting is gated by `SENTRY_ENABLED`, labelled by
//! `SENTRY_ENVIRONMENT`, and pointed at whatever DSN
//! `POST {KUBESHARK_CLOUD_API_URL}/sentry` hands back for the calling
//! service and version.
//!
//! # Architecture
//!
//! - [`bootstrap`] -- Startup wiring: gate, fetch, init, tag.
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`client`] -- Retrying hyper client bound to a [`Context`](context::Context).
//! - [`cmd`] -- Subcommand dispatch and execution (fetch, env, probe).
//! - [`context`] -- Cancellation and deadline carrier for outbound calls.
//! - [`dsn`] -- The DSN fetch against the cloud API.
//! - [`env`] -- Environment lookups behind the [`EnvSource`](env::EnvSource) trait.
//! - [`error`] -- Unified error type using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`retry`] -- Retry ceiling and pluggable backoff.
//! - [`sentry_integration`] -- Sentry SDK initialization.
//! - [`tags`] -- Scope tagging through the [`TagSink`](tags::TagSink) trait.

#![allow(clippy::missing_errors_doc)]

pub mod bootstrap;
pub mod cli;
pub mod client;
pub mod cmd;
pub mod context;
pub mod dsn;
pub mod env;
pub mod error;
pub mod logging;
pub mod retry;
pub mod sentry_integration;
pub mod tags;
