//! Cancellation and deadline carrier for outbound calls.
//!
//! A [`Context`] pairs a `tokio::sync::watch` cancellation flag with an
//! optional deadline. [`Context::done`] resolves with the reason the
//! context ended, so callers can race it against in-flight work with
//! `tokio::select!`.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::BootstrapError;

#[derive(Debug, Clone)]
pub struct Context {
    cancel: watch::Receiver<bool>,
    deadline: Option<Instant>,
}

/// Cancels every [`Context`] cloned from the one it was created with.
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        // send_replace never fails, even with no receivers left.
        self.0.send_replace(true);
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        let (_, rx) = watch::channel(false);
        Self {
            cancel: rx,
            deadline: None,
        }
    }

    #[must_use]
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                cancel: rx,
                deadline: None,
            },
            CancelHandle(tx),
        )
    }

    /// Adds a deadline `timeout` from now. An earlier existing deadline wins.
    /// A timeout too large to represent adds no deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if let Some(deadline) = Instant::now().checked_add(timeout) {
            self.deadline = Some(self.deadline.map_or(deadline, |d| d.min(deadline)));
        }
        self
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The reason this context has already ended, if it has.
    #[must_use]
    pub fn err(&self) -> Option<BootstrapError> {
        if *self.cancel.borrow() {
            return Some(BootstrapError::Cancelled);
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Some(BootstrapError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    /// Never resolves for a background context.
    pub async fn done(&self) -> BootstrapError {
        let mut cancel = self.cancel.clone();
        let cancelled = async move {
            loop {
                if *cancel.borrow_and_update() {
                    return;
                }
                if cancel.changed().await.is_err() {
                    // Sender gone without cancelling: this context can no longer be cancelled.
                    std::future::pending::<()>().await;
                }
            }
        };

        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    () = cancelled => BootstrapError::Cancelled,
                    () = tokio::time::sleep_until(deadline) => BootstrapError::DeadlineExceeded,
                }
            }
            None => {
                cancelled.await;
                BootstrapError::Cancelled
            }
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}
