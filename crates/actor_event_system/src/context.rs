//! # Dispatch Context
//!
//! Every handler invocation receives an [`EventContext`]: a cancellation token
//! plus an optional deadline. Both are cooperative. Nothing preempts a running
//! handler; handlers that do long work are expected to look at
//! [`EventContext::is_done`] or race their work against [`EventContext::done`].

use crate::error::EventError;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation and deadline scope for one dispatch.
#[derive(Debug, Clone)]
pub struct EventContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl EventContext {
    /// A context that is never cancelled by anyone else and has no deadline.
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Wraps an existing lifecycle token, without a deadline.
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Derives a child scope bounded by `timeout`.
    ///
    /// The child is cancelled together with its parent, and its deadline is
    /// never later than the parent's.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let requested = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(parent) if parent < requested => parent,
            _ => requested,
        };

        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Cancels this scope and every child derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// `true` once the scope is cancelled or its deadline has passed.
    pub fn is_done(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Reports why the scope is done, if it is.
    pub fn check(&self) -> Result<(), EventError> {
        if self.token.is_cancelled() {
            return Err(EventError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(EventError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Resolves when the scope is cancelled or the deadline passes.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }
}

impl Default for EventContext {
    fn default() -> Self {
        Self::background()
    }
}
