/// Handle for re-publishing into an actor's private bus from its handlers
use crate::bus::EventBus;
use crate::context::EventContext;
use crate::error::EventError;
use crate::event::Event;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Cheap, cloneable entry point to [`Actor::publish_local`](crate::Actor::publish_local).
///
/// Handlers live inside the bus, so a handler that captured the bus itself
/// would keep it alive forever. This handle only holds a weak reference and
/// reports [`EventError::BusUnavailable`] once the actor is gone.
#[derive(Debug, Clone)]
pub struct LocalPublisher {
    actor_id: Arc<str>,
    bus: Weak<EventBus>,
    token: CancellationToken,
    timeout: Duration,
}

impl LocalPublisher {
    pub(crate) fn new(
        actor_id: &str,
        bus: &Arc<EventBus>,
        token: CancellationToken,
        timeout: Duration,
    ) -> Self {
        Self {
            actor_id: Arc::from(actor_id),
            bus: Arc::downgrade(bus),
            token,
            timeout,
        }
    }

    pub fn actor_id(&self) -> &str {
        &self.actor_id
    }

    /// Publishes synchronously through the private bus, bypassing the mailbox.
    pub async fn publish(&self, event: &Event) -> Result<(), EventError> {
        let bus = self.bus.upgrade().ok_or(EventError::BusUnavailable)?;
        let ctx = EventContext::from_token(self.token.clone()).child_with_timeout(self.timeout);
        bus.publish(&ctx, event).await
    }
}
