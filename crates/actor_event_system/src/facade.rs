//! Process-wide convenience layer.
//!
//! Call sites that do not want to thread a [`RuntimeContext`] around use the
//! default context here. It is created on first use and lives until process
//! exit.

use crate::actor::Actor;
use crate::error::ActorError;
use crate::event::Event;
use crate::runtime::RuntimeContext;
use crate::system::System;
use std::sync::{Arc, OnceLock};

static DEFAULT_RUNTIME: OnceLock<RuntimeContext> = OnceLock::new();

/// The process-wide runtime context.
pub fn runtime() -> &'static RuntimeContext {
    DEFAULT_RUNTIME.get_or_init(RuntimeContext::default)
}

/// Registers a System constructor on the default runtime. Modules call this
/// once during startup.
pub fn register_system_factory<F>(factory: F)
where
    F: Fn() -> Box<dyn System> + Send + Sync + 'static,
{
    runtime().register_system_factory(factory);
}

/// Spawns an actor on the default runtime.
pub fn new_actor(id: impl Into<String>, mailbox_capacity: usize) -> Result<Actor, ActorError> {
    runtime().spawn_actor_with_capacity(id, mailbox_capacity)
}

pub fn broadcast(event: impl Into<Arc<Event>>) -> usize {
    runtime().broadcast(event)
}

pub fn broadcast_to_actors<I, S>(event: impl Into<Arc<Event>>, ids: I) -> usize
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    runtime().broadcast_to_actors(event, ids)
}

pub fn send_to_actor(id: &str, event: impl Into<Arc<Event>>) -> bool {
    runtime().send_to_actor(id, event)
}
