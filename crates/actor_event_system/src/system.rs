//! # System Capability
//!
//! Gameplay modules plug into actors through the [`System`] trait. A module
//! registers a [`SystemFactory`] once at startup; every actor constructed
//! afterwards builds one instance per factory and calls [`System::init`] on it
//! before the actor starts processing its mailbox.
//!
//! ```rust
//! use actor_event_system::{Actor, Event, EventType, System, SystemError};
//!
//! const ON_PING: EventType = EventType::new(1);
//!
//! struct PingSystem;
//!
//! impl System for PingSystem {
//!     fn name(&self) -> &str {
//!         "ping"
//!     }
//!
//!     fn init(&mut self, actor: &Actor) -> Result<(), SystemError> {
//!         actor.subscribe(ON_PING, 0, |_ctx, _event: &Event| Ok(()));
//!         Ok(())
//!     }
//! }
//! ```

use crate::actor::Actor;
use crate::error::SystemError;
use parking_lot::RwLock;
use std::sync::Arc;

/// A capability attached to every actor.
pub trait System: Send + Sync + 'static {
    /// Stable lookup key, unique per actor.
    fn name(&self) -> &str;

    /// Attaches handlers to the actor's private bus.
    fn init(&mut self, actor: &Actor) -> Result<(), SystemError>;

    /// Called once when the actor closes, before its processing task stops.
    fn on_close(&self) {}
}

/// Constructor for one [`System`] instance.
pub type SystemFactory = Arc<dyn Fn() -> Box<dyn System> + Send + Sync>;

/// Ordered constructor table. Actors instantiate factories in registration
/// order.
#[derive(Default)]
pub struct SystemFactories {
    factories: RwLock<Vec<SystemFactory>>,
}

impl SystemFactories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, factory: F)
    where
        F: Fn() -> Box<dyn System> + Send + Sync + 'static,
    {
        self.factories.write().push(Arc::new(factory));
    }

    pub fn len(&self) -> usize {
        self.factories.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.read().is_empty()
    }

    /// Copy of the table, so construction never holds the lock while a
    /// factory or `init` runs.
    pub fn snapshot(&self) -> Vec<SystemFactory> {
        self.factories.read().clone()
    }
}

impl std::fmt::Debug for SystemFactories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemFactories")
            .field("count", &self.len())
            .finish()
    }
}
