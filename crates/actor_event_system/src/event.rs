//! # Event Envelope
//!
//! [`Event`] is the immutable "what happened" record that flows through
//! mailboxes and buses. It carries:
//!
//! - **Type** - a small integer id ([`EventType`]) used for routing
//! - **Data** - ordered, opaque positional arguments ([`EventArg`])
//! - **Source** - the originating entity or service
//! - **Timestamp** - millisecond Unix epoch, stamped at construction
//! - **Trace id** - optional correlation string
//! - **Metadata** - string map, allocated on first write
//!
//! Cloning is shallow: the argument list and metadata map are copied, the
//! argument payloads themselves are shared. Every recipient of a broadcast can
//! therefore clone the event and edit its own view without affecting anyone
//! else.

use crate::utils::{current_timestamp_millis, new_trace_id};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Routing key of an event.
///
/// Gameplay modules declare their ids as constants:
///
/// ```rust
/// use actor_event_system::EventType;
///
/// pub const ON_LEVEL_UP: EventType = EventType::new(101);
/// assert_eq!(ON_LEVEL_UP.id(), 101);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(pub u32);

impl EventType {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EventType {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// One opaque positional argument of an event.
pub type EventArg = Arc<dyn Any + Send + Sync>;

/// Data envelope describing something that happened to an entity.
#[derive(Clone)]
pub struct Event {
    /// Routing key; always set.
    pub event_type: EventType,
    /// Positional arguments, insertion order significant.
    pub data: Vec<EventArg>,
    /// Originating entity or service identifier.
    pub source: String,
    /// Millisecond Unix epoch.
    pub timestamp: u64,
    /// Optional correlation id.
    pub trace_id: Option<String>,
    metadata: Option<HashMap<String, String>>,
}

impl Event {
    /// Creates an event with no arguments, stamped with the current time.
    pub fn new(event_type: impl Into<EventType>) -> Self {
        Self {
            event_type: event_type.into(),
            data: Vec::new(),
            source: String::new(),
            timestamp: current_timestamp_millis(),
            trace_id: None,
            metadata: None,
        }
    }

    /// Creates an event carrying an already-built argument list.
    pub fn with_args(event_type: impl Into<EventType>, args: Vec<EventArg>) -> Self {
        let mut event = Self::new(event_type);
        event.data = args;
        event
    }

    /// Appends a positional argument.
    pub fn with_arg<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.push_arg(value);
        self
    }

    pub fn push_arg<T: Any + Send + Sync>(&mut self, value: T) {
        self.data.push(Arc::new(value));
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Attaches a freshly generated trace id.
    pub fn with_new_trace_id(self) -> Self {
        self.with_trace_id(new_trace_id())
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_metadata(key, value);
        self
    }

    /// Writes a metadata entry, allocating the map on first use.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|map| map.get(key))
            .map(String::as_str)
    }

    pub fn has_metadata(&self) -> bool {
        self.metadata.as_ref().is_some_and(|map| !map.is_empty())
    }

    /// The whole metadata map, `None` until something has been written.
    pub fn metadata_map(&self) -> Option<&HashMap<String, String>> {
        self.metadata.as_ref()
    }

    /// Typed positional access.
    ///
    /// Returns `None` when the index is out of range or the argument at that
    /// position is not a `T`.
    pub fn arg<T: Any>(&self, index: usize) -> Option<&T> {
        self.data.get(index)?.downcast_ref::<T>()
    }

    pub fn arg_count(&self) -> usize {
        self.data.len()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("event_type", &self.event_type)
            .field("args", &self.data.len())
            .field("source", &self.source)
            .field("timestamp", &self.timestamp)
            .field("trace_id", &self.trace_id)
            .field("metadata", &self.metadata)
            .finish()
    }
}
