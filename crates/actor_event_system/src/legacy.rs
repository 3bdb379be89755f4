//! Compatibility shim for call sites that predate actors.
//!
//! A single hidden process-wide bus with fire-and-forget handlers. It shares
//! nothing with any actor's private bus or with the runtime template.

use crate::bus::EventBus;
use crate::context::EventContext;
use crate::error::EventError;
use crate::event::{Event, EventArg, EventType};
use std::sync::OnceLock;
use tracing::warn;

static LEGACY_BUS: OnceLock<EventBus> = OnceLock::new();

fn bus() -> &'static EventBus {
    LEGACY_BUS.get_or_init(EventBus::new)
}

/// Registers `handler` for `event_type` at priority 0.
pub fn subscribe<F>(event_type: impl Into<EventType>, handler: F)
where
    F: Fn(&EventContext, &Event) + Send + Sync + 'static,
{
    bus().subscribe(event_type, 0, move |ctx, event| {
        handler(ctx, event);
        Ok(())
    });
}

/// Publishes an event built from `args` to every legacy subscriber, in
/// registration order.
pub async fn publish(
    event_type: impl Into<EventType>,
    args: Vec<EventArg>,
) -> Result<(), EventError> {
    let event = Event::with_args(event_type, args).with_source("legacy");
    let result = bus().publish(&EventContext::background(), &event).await;
    if let Err(error) = &result {
        warn!(event_type = %event.event_type, %error, "Legacy handler failed");
    }
    result
}

pub fn subscriber_count(event_type: impl Into<EventType>) -> usize {
    bus().subscriber_count(event_type)
}
