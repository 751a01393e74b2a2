//! Scope tagging.
//!
//! [`apply_tags`] writes every non-empty tag into a [`TagSink`]. The
//! production sink, [`SentryScope`], writes to a specific Sentry hub
//! (the process-wide main hub by default) so tags land in the same place
//! whichever thread applies them. Tests substitute their own sink.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use sentry::Hub;

/// Write-only destination for tags.
pub trait TagSink {
    fn apply(&self, key: &str, value: &str);
}

/// The scope of one Sentry hub.
#[derive(Clone)]
pub struct SentryScope {
    hub: Arc<Hub>,
}

impl SentryScope {
    /// The process-wide hub, shared by every thread.
    #[must_use]
    pub fn main() -> Self {
        Self { hub: Hub::main() }
    }

    #[must_use]
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }

    #[must_use]
    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }
}

impl Default for SentryScope {
    fn default() -> Self {
        Self::main()
    }
}

impl fmt::Debug for SentryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentryScope")
            .field("main", &Arc::ptr_eq(&self.hub, &Hub::main()))
            .finish()
    }
}

impl TagSink for SentryScope {
    fn apply(&self, key: &str, value: &str) {
        self.hub.configure_scope(|scope| scope.set_tag(key, value));
    }
}

/// Applies each tag with a non-empty value; empty values are skipped.
pub fn apply_tags<S: TagSink + ?Sized>(sink: &S, tags: &HashMap<String, String>) {
    for (key, value) in tags {
        if !value.is_empty() {
            sink.apply(key, value);
        }
    }
}
