//! Error types for the actor event system.
//!
//! Lookup misses (unknown actor, unknown system) are not errors here: they are
//! reported as `None` / `false` by the APIs that perform the lookup.

/// Errors produced while dispatching an event to its handlers.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// Handler execution failed during event processing
    #[error("Handler execution error: {0}")]
    HandlerExecution(String),
    /// Handler panicked; the panic was contained by the bus
    #[error("Handler '{0}' panicked")]
    HandlerPanicked(String),
    /// The dispatch context was cancelled
    #[error("Event context cancelled")]
    Cancelled,
    /// The dispatch context ran past its deadline
    #[error("Event context deadline exceeded")]
    DeadlineExceeded,
    /// The bus behind a publisher handle has been dropped
    #[error("Event bus is no longer available")]
    BusUnavailable,
    #[error("An unexpected error occurred: {0}")]
    Other(String),
}

impl EventError {
    /// Shorthand for [`EventError::HandlerExecution`].
    pub fn handler(message: impl Into<String>) -> Self {
        EventError::HandlerExecution(message.into())
    }
}

/// Why a non-blocking send into a mailbox was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MailboxError {
    /// The mailbox is at capacity; the event was dropped.
    #[error("mailbox is full")]
    Full,
    /// The owning actor is closing or gone.
    #[error("mailbox is closed")]
    Closed,
}

/// Errors a [`System`](crate::System) may report from its `init` hook.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("System initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Event system error: {0}")]
    Event(#[from] EventError),
}

/// Errors raised while constructing an [`Actor`](crate::Actor).
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    #[error("System '{system}' failed to initialize on actor '{actor_id}': {source}")]
    SystemInit {
        actor_id: String,
        system: String,
        #[source]
        source: SystemError,
    },
}
