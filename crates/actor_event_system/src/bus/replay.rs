/// Replay log entries used to rebuild an equivalent bus
use crate::event::EventType;
use crate::handler::EventHandler;
use std::fmt;
use std::sync::Arc;

/// Everything needed to reproduce one `subscribe` call on another bus.
///
/// The handler is shared, not copied: a clone and its source invoke the same
/// handler object.
#[derive(Clone)]
pub struct SubscriptionRecord {
    pub event_type: EventType,
    pub priority: i32,
    pub handler: Arc<dyn EventHandler>,
}

impl fmt::Debug for SubscriptionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionRecord")
            .field("event_type", &self.event_type)
            .field("priority", &self.priority)
            .field("handler", &self.handler.handler_name())
            .finish()
    }
}

/// One step of a bus's subscription history, in the order it happened.
#[derive(Debug, Clone)]
pub enum ReplayEntry {
    Subscribe(SubscriptionRecord),
    /// Every handler for this type was removed.
    Unsubscribe(EventType),
}

impl ReplayEntry {
    pub fn event_type(&self) -> EventType {
        match self {
            ReplayEntry::Subscribe(record) => record.event_type,
            ReplayEntry::Unsubscribe(event_type) => *event_type,
        }
    }
}
