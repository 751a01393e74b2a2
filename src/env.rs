//! Environment-driven settings: the reporting gate, the environment
//! label, and the DSN endpoint.
//!
//! All lookups go through the [`EnvSource`] trait so callers can pass
//! [`ProcessEnv`] in production and a fixed [`MapEnv`] in tests without
//! touching the real process environment.

use std::collections::HashMap;

pub const SENTRY_ENABLED: &str = "SENTRY_ENABLED";
pub const SENTRY_ENVIRONMENT: &str = "SENTRY_ENVIRONMENT";
pub const CLOUD_API_URL: &str = "KUBESHARK_CLOUD_API_URL";

pub const DEFAULT_ENVIRONMENT: &str = "undefined";
pub const DEFAULT_CLOUD_API_URL: &str = "https://api.kubeshark.co";
pub const DSN_PATH: &str = "/sentry";

/// A key/value lookup. `None` means unset; `Some("")` means set to empty.
pub trait EnvSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        // Non-UTF-8 values are treated as set-but-unreadable, not as unset.
        std::env::var_os(key).map(|v| v.to_string_lossy().into_owned())
    }
}

/// Fixed in-memory environment.
#[derive(Debug, Clone, Default)]
pub struct MapEnv(HashMap<String, String>);

impl MapEnv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl EnvSource for MapEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

/// Whether error reporting is switched on. Only the exact string `"true"` counts.
#[must_use]
pub fn is_enabled(env: &dyn EnvSource) -> bool {
    env.get(SENTRY_ENABLED).as_deref() == Some("true")
}

/// The deployment environment label, falling back to `"undefined"` when unset.
#[must_use]
pub fn environment(env: &dyn EnvSource) -> String {
    env.get(SENTRY_ENVIRONMENT)
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
}

/// `{base}/sentry`, where `base` comes from `KUBESHARK_CLOUD_API_URL`.
#[must_use]
pub fn dsn_endpoint(env: &dyn EnvSource) -> String {
    let base = env
        .get(CLOUD_API_URL)
        .unwrap_or_else(|| DEFAULT_CLOUD_API_URL.to_string());
    format!("{base}{DSN_PATH}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_only_for_exact_true() {
        assert!(is_enabled(&MapEnv::new().with(SENTRY_ENABLED, "true")));

        assert!(!is_enabled(&MapEnv::new()));
        for value in ["1", "True", "TRUE", "", " true", "true ", "yes"] {
            let env = MapEnv::new().with(SENTRY_ENABLED, value);
            assert!(!is_enabled(&env), "{value:?} must not enable reporting");
        }
    }

    #[test]
    fn environment_falls_back_when_unset() {
        assert_eq!(environment(&MapEnv::new()), "undefined");
    }

    #[test]
    fn environment_returns_set_value() {
        let env = MapEnv::new().with(SENTRY_ENVIRONMENT, "staging");
        assert_eq!(environment(&env), "staging");
    }

    #[test]
    fn environment_keeps_explicit_empty() {
        let env = MapEnv::new().with(SENTRY_ENVIRONMENT, "");
        assert_eq!(environment(&env), "");
    }

    #[test]
    fn endpoint_defaults_to_production() {
        assert_eq!(dsn_endpoint(&MapEnv::new()), "https://api.kubeshark.co/sentry");
    }

    #[test]
    fn endpoint_uses_override() {
        let env = MapEnv::new().with(CLOUD_API_URL, "http://local:9000");
        assert_eq!(dsn_endpoint(&env), "http://local:9000/sentry");
    }

    #[test]
    fn map_env_collects_from_pairs() {
        let env: MapEnv = [(SENTRY_ENABLED, "true"), (SENTRY_ENVIRONMENT, "dev")]
            .into_iter()
            .collect();
        assert!(is_enabled(&env));
        assert_eq!(environment(&env), "dev");
    }
}
