//! # Actor Event System
//!
//! The per-entity concurrency and messaging core of the game server. Every
//! game entity runs as an [`Actor`] with its own mailbox, its own private
//! [`EventBus`] and a single processing task, so gameplay modules communicate
//! through events instead of shared mutable state.
//!
//! ## Core Features
//!
//! - **Strict per-actor ordering**: mailbox events are processed one at a time,
//!   in arrival order
//! - **Priority dispatch**: handlers run in descending priority, registration
//!   order for ties, and the first failure stops the dispatch
//! - **Non-blocking delivery**: broadcast and targeted sends never wait; a full
//!   mailbox drops the event for that actor only
//! - **Pluggable capabilities**: gameplay modules register [`System`] factories
//!   and attach handlers during actor construction
//! - **Replay cloning**: each actor's bus is rebuilt from the template bus's
//!   subscription history
//!
//! ## Architecture Overview
//!
//! - [`Event`] - immutable envelope with positional arguments
//! - [`EventBus`] - priority-ordered dispatcher with a replay log
//! - [`Mailbox`] - bounded, non-blocking-send queue
//! - [`ActorRegistry`] - id → mailbox directory for broadcast
//! - [`System`] / [`SystemFactories`] - capability contract
//! - [`Actor`] - lifecycle, private bus and processing task
//! - [`RuntimeContext`] - the shared pieces above, constructed explicitly
//! - [`facade`] / [`legacy`] - process-wide helpers
//!
//! ## Quick Start Example
//!
//! ```rust,no_run
//! use actor_event_system::*;
//!
//! const ON_ADD_EXP: EventType = EventType::new(1);
//!
//! struct LevelSystem;
//!
//! impl System for LevelSystem {
//!     fn name(&self) -> &str {
//!         "level"
//!     }
//!
//!     fn init(&mut self, actor: &Actor) -> Result<(), SystemError> {
//!         let id = actor.id().to_string();
//!         actor.subscribe(ON_ADD_EXP, 0, move |_ctx, event| {
//!             let amount = event.arg::<u64>(0).copied().unwrap_or(0);
//!             println!("{id} gained {amount} exp");
//!             Ok(())
//!         });
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runtime = RuntimeContext::new(RuntimeConfig::default());
//!     runtime.register_system_factory(|| Box::new(LevelSystem));
//!
//!     let hero = runtime.spawn_actor("hero")?;
//!     runtime.broadcast(Event::new(ON_ADD_EXP).with_arg(120u64));
//!
//!     hero.close().await;
//!     runtime.shutdown();
//!     Ok(())
//! }
//! ```

// tests
#[cfg(test)]
mod test_integration;

pub mod actor;
pub mod bus;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod facade;
pub mod handler;
pub mod legacy;
pub mod mailbox;
pub mod registry;
pub mod runtime;
pub mod system;
pub mod utils;

pub use actor::{Actor, ActorState, LocalPublisher};
pub use bus::{BusStats, EventBus, ReplayEntry, SubscriptionRecord};
pub use config::{ActorConfig, RuntimeConfig};
pub use context::EventContext;
pub use error::{ActorError, EventError, MailboxError, SystemError};
pub use event::{Event, EventArg, EventType};
pub use handler::{AsyncFnHandler, EventHandler, FnHandler};
pub use mailbox::{mailbox, Mailbox, MailboxReceiver};
pub use registry::{ActorRegistry, RegistryStats, Unregister};
pub use runtime::RuntimeContext;
pub use system::{System, SystemFactories, SystemFactory};
pub use utils::{current_timestamp_millis, new_trace_id};

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;
