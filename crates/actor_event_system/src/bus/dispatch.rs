/// Ordered and parallel dispatch
use super::core::EventBus;
use super::stats::BusCounters;
use crate::context::EventContext;
use crate::error::EventError;
use crate::event::Event;
use crate::handler::EventHandler;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{trace, warn};

impl EventBus {
    /// Dispatches `event` to its handlers one after another, highest priority
    /// first.
    ///
    /// The first handler that fails ends the dispatch: lower-priority handlers
    /// are skipped and that error is returned. A panicking handler counts as a
    /// failure ([`EventError::HandlerPanicked`]).
    pub async fn publish(&self, ctx: &EventContext, event: &Event) -> Result<(), EventError> {
        let Some(handlers) = self.snapshot(event.event_type) else {
            trace!(event_type = %event.event_type, "No subscribers for event");
            return Ok(());
        };

        BusCounters::bump(&self.counters.events_published);

        for subscriber in handlers.iter() {
            BusCounters::bump(&self.counters.handler_invocations);
            if let Err(error) = invoke(subscriber.handler.as_ref(), ctx, event).await {
                BusCounters::bump(&self.counters.handler_failures);
                return Err(error);
            }
        }

        Ok(())
    }

    /// Runs every handler for `event` on its own task and waits for all of them.
    ///
    /// No ordering between handlers; failures are logged and otherwise
    /// discarded.
    pub async fn publish_async(&self, ctx: &EventContext, event: Arc<Event>) {
        let Some(handlers) = self.snapshot(event.event_type) else {
            trace!(event_type = %event.event_type, "No subscribers for event");
            return;
        };

        BusCounters::bump(&self.counters.events_fanned_out);

        let mut tasks = JoinSet::new();
        for subscriber in handlers.iter() {
            BusCounters::bump(&self.counters.handler_invocations);
            let handler = Arc::clone(&subscriber.handler);
            let ctx = ctx.clone();
            let event = Arc::clone(&event);
            tasks.spawn(async move {
                let result = invoke(handler.as_ref(), &ctx, &event).await;
                (handler, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((handler, Err(error))) => {
                    BusCounters::bump(&self.counters.handler_failures);
                    warn!(
                        event_type = %event.event_type,
                        handler = handler.handler_name(),
                        %error,
                        "Handler failed during parallel dispatch"
                    );
                }
                Err(join_error) => {
                    BusCounters::bump(&self.counters.handler_failures);
                    warn!(
                        event_type = %event.event_type,
                        %join_error,
                        "Handler task did not complete"
                    );
                }
            }
        }
    }
}

/// Calls one handler, turning a panic into an error.
async fn invoke(
    handler: &dyn EventHandler,
    ctx: &EventContext,
    event: &Event,
) -> Result<(), EventError> {
    match AssertUnwindSafe(handler.handle(ctx, event)).catch_unwind().await {
        Ok(result) => result,
        Err(_) => Err(EventError::HandlerPanicked(handler.handler_name().to_string())),
    }
}
