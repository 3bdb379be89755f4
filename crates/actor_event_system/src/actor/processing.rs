/// The per-actor processing task
use crate::bus::EventBus;
use crate::config::ActorConfig;
use crate::context::EventContext;
use crate::event::Event;
use crate::mailbox::MailboxReceiver;
use crate::registry::Unregister;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Everything the processing task owns. Only this task ever reads the mailbox.
pub(crate) struct ProcessingLoop {
    pub actor_id: String,
    pub bus: Arc<EventBus>,
    pub receiver: MailboxReceiver,
    pub token: CancellationToken,
    pub unregister: Unregister,
    pub config: ActorConfig,
}

impl ProcessingLoop {
    pub async fn run(mut self) {
        let lifecycle = EventContext::from_token(self.token.clone());

        loop {
            let next = tokio::select! {
                biased;
                _ = self.token.cancelled() => None,
                event = self.receiver.recv() => event,
            };
            let Some(event) = next else {
                break;
            };

            let ctx = lifecycle.child_with_timeout(self.config.event_timeout);
            self.dispatch(&ctx, &event).await;
        }

        // refuse new sends, keep what is already buffered
        self.receiver.close();
        let drained = self.drain().await;

        self.unregister.unregister();
        info!(actor_id = %self.actor_id, drained, "Actor processing stopped");
    }

    async fn drain(&mut self) -> usize {
        let mut drained = 0;
        while let Some(event) = self.receiver.try_recv() {
            // the lifecycle token is already cancelled here
            let ctx = EventContext::background().child_with_timeout(self.config.drain_timeout);
            self.dispatch(&ctx, &event).await;
            drained += 1;
        }
        if drained > 0 {
            debug!(actor_id = %self.actor_id, drained, "Drained buffered events");
        }
        drained
    }

    async fn dispatch(&self, ctx: &EventContext, event: &Event) {
        if let Err(error) = self.bus.publish(ctx, event).await {
            error!(
                actor_id = %self.actor_id,
                event_type = %event.event_type,
                %error,
                "Event handler failed"
            );
        }
    }
}
