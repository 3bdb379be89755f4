//! # Runtime Context
//!
//! [`RuntimeContext`] bundles everything actors share: the template bus whose
//! history every new actor replays, the actor registry, the System factory
//! table and the runtime configuration. Several contexts can coexist in one
//! process; tests typically build one each.

use crate::actor::Actor;
use crate::bus::EventBus;
use crate::config::RuntimeConfig;
use crate::error::ActorError;
use crate::event::Event;
use crate::registry::{ActorRegistry, RegistryStats};
use crate::system::{System, SystemFactories};
use std::sync::Arc;
use tracing::{debug, info};

/// Shared state for a family of actors.
#[derive(Debug)]
pub struct RuntimeContext {
    config: RuntimeConfig,
    template: EventBus,
    registry: Arc<ActorRegistry>,
    factories: SystemFactories,
}

impl RuntimeContext {
    pub fn new(config: RuntimeConfig) -> Self {
        debug!(?config, "Creating runtime context");
        Self {
            config,
            template: EventBus::new(),
            registry: ActorRegistry::new(),
            factories: SystemFactories::new(),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Bus whose subscriptions every actor spawned afterwards inherits.
    pub fn template(&self) -> &EventBus {
        &self.template
    }

    pub fn registry(&self) -> &Arc<ActorRegistry> {
        &self.registry
    }

    pub fn factories(&self) -> &SystemFactories {
        &self.factories
    }

    /// Adds a System constructor. Only actors spawned afterwards get it.
    pub fn register_system_factory<F>(&self, factory: F)
    where
        F: Fn() -> Box<dyn System> + Send + Sync + 'static,
    {
        self.factories.register(factory);
    }

    /// Spawns an actor with the configured mailbox capacity.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_actor(&self, id: impl Into<String>) -> Result<Actor, ActorError> {
        self.spawn_actor_with_capacity(id, self.config.mailbox_capacity)
    }

    pub fn spawn_actor_with_capacity(
        &self,
        id: impl Into<String>,
        mailbox_capacity: usize,
    ) -> Result<Actor, ActorError> {
        Actor::start(
            id.into(),
            &self.template,
            &self.registry,
            &self.factories,
            self.config.actor_config(mailbox_capacity),
        )
    }

    /// Offers `event` to every registered actor. Returns how many accepted it.
    pub fn broadcast(&self, event: impl Into<Arc<Event>>) -> usize {
        self.registry.broadcast(event)
    }

    pub fn broadcast_to_actors<I, S>(&self, event: impl Into<Arc<Event>>, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry.broadcast_to_actors(event, ids)
    }

    /// `false` when the actor is unknown or its mailbox is full.
    pub fn send_to_actor(&self, id: &str, event: impl Into<Arc<Event>>) -> bool {
        self.registry.send_to_actor(id, event)
    }

    pub fn registry_stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    /// Detaches every actor from the registry. Actors keep running until
    /// closed; new registrations are ignored.
    pub fn shutdown(&self) {
        info!(actors = self.registry.actor_count(), "Shutting down runtime context");
        self.registry.close();
    }
}

impl Default for RuntimeContext {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}
