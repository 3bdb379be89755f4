//! # Actor Runtime
//!
//! An [`Actor`] is one game entity's isolated event-processing unit. It owns:
//!
//! - a private [`EventBus`](crate::EventBus), replayed from the runtime's template
//! - a bounded [`Mailbox`](crate::Mailbox) registered in the actor registry
//! - one instance of every registered [`System`](crate::System)
//! - a lifecycle token and the single processing task that drains the mailbox
//!
//! ## Lifecycle
//!
//! ```text
//! Running ──close()/drop──► Closing ──task exits──► Closed
//! ```
//!
//! Construction runs every System's `init` before the mailbox is registered
//! and before the processing task starts, so no event can reach an actor whose
//! handlers are not all attached yet.
//!
//! While running, the task takes mailbox events strictly in arrival order and
//! publishes each through the private bus with a bounded context. On
//! cancellation it closes the mailbox, drains what is still buffered, removes
//! its registry entry and exits.

mod core;
mod processing;
mod publisher;

pub use self::core::Actor;
pub use publisher::LocalPublisher;

use serde::{Deserialize, Serialize};

/// Where an actor is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorState {
    Running,
    Closing,
    Closed,
}

impl ActorState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => ActorState::Running,
            1 => ActorState::Closing,
            _ => ActorState::Closed,
        }
    }

    pub(crate) fn as_u8(self) -> u8 {
        match self {
            ActorState::Running => 0,
            ActorState::Closing => 1,
            ActorState::Closed => 2,
        }
    }
}

impl std::fmt::Display for ActorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActorState::Running => write!(f, "running"),
            ActorState::Closing => write!(f, "closing"),
            ActorState::Closed => write!(f, "closed"),
        }
    }
}
