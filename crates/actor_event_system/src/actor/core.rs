/// Core Actor struct: construction, accessors, close
use super::processing::ProcessingLoop;
use super::publisher::LocalPublisher;
use super::ActorState;
use crate::bus::EventBus;
use crate::config::ActorConfig;
use crate::context::EventContext;
use crate::error::{ActorError, EventError, MailboxError};
use crate::event::{Event, EventType};
use crate::handler::EventHandler;
use crate::mailbox::{mailbox, Mailbox};
use crate::registry::ActorRegistry;
use crate::system::{System, SystemFactories};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// One entity's event-processing unit. See the [module docs](super).
pub struct Actor {
    id: String,
    bus: Arc<EventBus>,
    mailbox: Mailbox,
    systems: HashMap<String, Arc<dyn System>>,
    token: CancellationToken,
    config: ActorConfig,
    state: AtomicU8,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Actor {
    /// Builds and starts an actor.
    ///
    /// Order matters: bus replay, then every System's `init`, then registry
    /// registration, then the processing task. Must be called from within a
    /// Tokio runtime.
    pub(crate) fn start(
        id: String,
        template: &EventBus,
        registry: &Arc<ActorRegistry>,
        factories: &SystemFactories,
        config: ActorConfig,
    ) -> Result<Actor, ActorError> {
        let (mailbox, receiver) = mailbox(config.mailbox_capacity);

        let mut actor = Actor {
            id,
            bus: Arc::new(template.clone_by_replay()),
            mailbox,
            systems: HashMap::new(),
            token: CancellationToken::new(),
            config,
            state: AtomicU8::new(ActorState::Running.as_u8()),
            task: Mutex::new(None),
        };

        for factory in factories.snapshot() {
            let mut system = factory();
            let name = system.name().to_string();

            if let Err(source) = system.init(&actor) {
                // give the systems that did initialize a chance to clean up
                for initialized in actor.systems.values() {
                    initialized.on_close();
                }
                return Err(ActorError::SystemInit {
                    actor_id: actor.id.clone(),
                    system: name,
                    source,
                });
            }

            if actor.systems.insert(name.clone(), Arc::from(system)).is_some() {
                warn!(
                    actor_id = %actor.id,
                    system = %name,
                    "Duplicate system name, keeping the later instance"
                );
            }
        }

        let unregister = registry.register(actor.id.clone(), actor.mailbox.clone());
        if !unregister.is_registered() {
            warn!(actor_id = %actor.id, "Registry is closed, actor is only reachable directly");
        }

        let processing = ProcessingLoop {
            actor_id: actor.id.clone(),
            bus: Arc::clone(&actor.bus),
            receiver,
            token: actor.token.clone(),
            unregister,
            config: actor.config,
        };
        *actor.task.get_mut() = Some(tokio::spawn(processing.run()));

        info!(
            actor_id = %actor.id,
            systems = actor.systems.len(),
            mailbox_capacity = actor.mailbox.capacity(),
            "Actor started"
        );
        Ok(actor)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The private bus. Handlers registered here never affect other actors.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// A sending handle to this actor's mailbox.
    pub fn mailbox(&self) -> Mailbox {
        self.mailbox.clone()
    }

    pub fn config(&self) -> &ActorConfig {
        &self.config
    }

    /// Enqueues `event` for the processing task without waiting.
    pub fn send(&self, event: impl Into<Arc<Event>>) -> Result<(), MailboxError> {
        self.mailbox.try_send(event)
    }

    /// Attaches a synchronous handler to the private bus.
    pub fn subscribe<F>(&self, event_type: impl Into<EventType>, priority: i32, handler: F)
    where
        F: Fn(&EventContext, &Event) -> Result<(), EventError> + Send + Sync + 'static,
    {
        self.bus.subscribe(event_type, priority, handler);
    }

    pub fn subscribe_async<F, Fut>(
        &self,
        event_type: impl Into<EventType>,
        priority: i32,
        handler: F,
    ) where
        F: Fn(EventContext, Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), EventError>> + Send + 'static,
    {
        self.bus.subscribe_async(event_type, priority, handler);
    }

    pub fn subscribe_handler(
        &self,
        event_type: impl Into<EventType>,
        priority: i32,
        handler: Arc<dyn EventHandler>,
    ) {
        self.bus.subscribe_handler(event_type, priority, handler);
    }

    /// Publishes straight through the private bus, bypassing the mailbox.
    pub async fn publish_local(&self, event: &Event) -> Result<(), EventError> {
        let ctx = EventContext::from_token(self.token.clone())
            .child_with_timeout(self.config.local_publish_timeout);
        self.bus.publish(&ctx, event).await
    }

    /// A handle handlers can capture to call `publish_local` later.
    pub fn publisher(&self) -> LocalPublisher {
        LocalPublisher::new(
            &self.id,
            &self.bus,
            self.token.clone(),
            self.config.local_publish_timeout,
        )
    }

    pub fn get_system(&self, name: &str) -> Option<Arc<dyn System>> {
        self.systems.get(name).cloned()
    }

    /// Names of the attached systems, sorted.
    pub fn system_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.systems.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn state(&self) -> ActorState {
        ActorState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Stops the actor and waits for its processing task to exit.
    ///
    /// The first call runs every System's `on_close`, then cancels the
    /// lifecycle token. Every call, concurrent ones included, returns only once
    /// the task has drained the mailbox and removed the registry entry. A call
    /// abandoned mid-wait (for example under a timeout) leaves the task handle
    /// in place, so the next call still waits for it.
    ///
    /// Awaiting this from one of the actor's own handlers never completes.
    pub async fn close(&self) {
        if self.begin_closing() {
            info!(actor_id = %self.id, "Closing actor");
            for system in self.systems.values() {
                system.on_close();
            }
            self.token.cancel();
        }

        let mut task = self.task.lock().await;
        if let Some(handle) = task.as_mut() {
            let result = handle.await;
            *task = None;
            if let Err(join_error) = result {
                error!(actor_id = %self.id, %join_error, "Actor processing task failed");
            }
            self.state.store(ActorState::Closed.as_u8(), Ordering::Release);
            info!(actor_id = %self.id, "Actor closed");
        }
    }

    /// Moves `Running` to `Closing`. `true` for the caller that made the move.
    fn begin_closing(&self) -> bool {
        self.state
            .compare_exchange(
                ActorState::Running.as_u8(),
                ActorState::Closing.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Moves to `Closing` and cancels the token without waiting or running
    /// `on_close`.
    pub(crate) fn stop_processing(&self) {
        self.begin_closing();
        self.token.cancel();
    }
}

impl Drop for Actor {
    fn drop(&mut self) {
        // a dropped actor still drains and unregisters in the background
        self.stop_processing();
    }
}

impl std::fmt::Debug for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Actor")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("systems", &self.system_names())
            .finish()
    }
}
