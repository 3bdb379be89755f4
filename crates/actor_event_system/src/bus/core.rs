/// Core EventBus struct: subscriber table, replay log, cloning
use super::replay::{ReplayEntry, SubscriptionRecord};
use super::stats::{BusCounters, BusStats};
use crate::context::EventContext;
use crate::error::EventError;
use crate::event::{Event, EventType};
use crate::handler::{closure_name, AsyncFnHandler, EventHandler, FnHandler};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub(crate) struct Subscriber {
    pub priority: i32,
    pub handler: Arc<dyn EventHandler>,
}

/// Priority-ordered, multi-subscriber dispatcher keyed by [`EventType`].
///
/// Lists are copy-on-write: dispatch takes an `Arc` snapshot of the list for
/// its type and never holds a lock while a handler runs, so handlers may
/// subscribe or publish on the same bus.
///
/// Lock order is replay log, then subscriber shard.
pub struct EventBus {
    pub(crate) subscribers: DashMap<EventType, Arc<Vec<Subscriber>>>,
    pub(crate) replay: Mutex<Vec<ReplayEntry>>,
    pub(crate) counters: BusCounters,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: DashMap::new(),
            replay: Mutex::new(Vec::new()),
            counters: BusCounters::default(),
        }
    }

    /// Registers `handler` for `event_type`.
    ///
    /// Higher priority runs first; equal priorities keep registration order.
    /// The call is recorded in the replay log.
    pub fn subscribe_handler(
        &self,
        event_type: impl Into<EventType>,
        priority: i32,
        handler: Arc<dyn EventHandler>,
    ) {
        let event_type = event_type.into();
        let mut replay = self.replay.lock();
        self.insert_subscriber(event_type, priority, handler.clone());
        replay.push(ReplayEntry::Subscribe(SubscriptionRecord {
            event_type,
            priority,
            handler,
        }));
    }

    /// Registers a synchronous closure.
    pub fn subscribe<F>(&self, event_type: impl Into<EventType>, priority: i32, handler: F)
    where
        F: Fn(&EventContext, &Event) -> Result<(), EventError> + Send + Sync + 'static,
    {
        let handler = FnHandler::new(closure_name::<F>(), handler);
        self.subscribe_handler(event_type, priority, Arc::new(handler));
    }

    /// Registers a closure returning a future.
    pub fn subscribe_async<F, Fut>(
        &self,
        event_type: impl Into<EventType>,
        priority: i32,
        handler: F,
    ) where
        F: Fn(EventContext, Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), EventError>> + Send + 'static,
    {
        let handler = AsyncFnHandler::new(closure_name::<F>(), handler);
        self.subscribe_handler(event_type, priority, Arc::new(handler));
    }

    fn insert_subscriber(
        &self,
        event_type: EventType,
        priority: i32,
        handler: Arc<dyn EventHandler>,
    ) {
        let mut entry = self.subscribers.entry(event_type).or_default();
        let list = Arc::make_mut(entry.value_mut());
        list.push(Subscriber { priority, handler });
        // stable: ties keep registration order
        list.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Removes every handler registered for `event_type`.
    pub fn unsubscribe(&self, event_type: impl Into<EventType>) {
        let event_type = event_type.into();
        let mut replay = self.replay.lock();
        let removed = self
            .subscribers
            .remove(&event_type)
            .map(|(_, list)| list.len())
            .unwrap_or(0);
        replay.push(ReplayEntry::Unsubscribe(event_type));
        debug!(%event_type, removed, "Unsubscribed all handlers");
    }

    /// Drops all subscribers, the replay log and the counters.
    pub fn clear(&self) {
        let mut replay = self.replay.lock();
        self.subscribers.clear();
        replay.clear();
        self.counters.reset();
    }

    /// Builds an independent bus by replaying this bus's subscription history.
    ///
    /// The new bus has its own storage: subscribing on either side afterwards
    /// does not affect the other. Handler objects are shared.
    pub fn clone_by_replay(&self) -> EventBus {
        let clone = EventBus::new();
        let replay = self.replay.lock();
        for entry in replay.iter() {
            match entry {
                ReplayEntry::Subscribe(record) => clone.subscribe_handler(
                    record.event_type,
                    record.priority,
                    record.handler.clone(),
                ),
                ReplayEntry::Unsubscribe(event_type) => clone.unsubscribe(*event_type),
            }
        }
        clone
    }

    pub fn subscriber_count(&self, event_type: impl Into<EventType>) -> usize {
        self.subscribers
            .get(&event_type.into())
            .map(|list| list.len())
            .unwrap_or(0)
    }

    /// Event types that currently have at least one subscriber, ascending.
    pub fn event_types(&self) -> Vec<EventType> {
        let mut types: Vec<EventType> = self
            .subscribers
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| *entry.key())
            .collect();
        types.sort();
        types
    }

    /// Copy of the replay log.
    pub fn records(&self) -> Vec<ReplayEntry> {
        self.replay.lock().clone()
    }

    pub fn replay_len(&self) -> usize {
        self.replay.lock().len()
    }

    pub fn stats(&self) -> BusStats {
        let (subscribed_types, total_subscribers) = self
            .subscribers
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .fold((0, 0), |(types, total), entry| (types + 1, total + entry.value().len()));

        BusStats {
            events_published: self.counters.events_published.load(Ordering::Relaxed),
            events_fanned_out: self.counters.events_fanned_out.load(Ordering::Relaxed),
            handler_invocations: self.counters.handler_invocations.load(Ordering::Relaxed),
            handler_failures: self.counters.handler_failures.load(Ordering::Relaxed),
            subscribed_types,
            total_subscribers,
            replay_len: self.replay_len(),
        }
    }

    /// Snapshot of the handlers for one type, in dispatch order.
    pub(crate) fn snapshot(&self, event_type: EventType) -> Option<Arc<Vec<Subscriber>>> {
        self.subscribers
            .get(&event_type)
            .map(|list| Arc::clone(list.value()))
            .filter(|list| !list.is_empty())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("event_types", &self.subscribers.len())
            .field("replay_len", &self.replay_len())
            .finish()
    }
}
