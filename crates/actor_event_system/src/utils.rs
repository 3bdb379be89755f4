//! # Utility Functions
//!
//! Timestamp and correlation id helpers shared by every event producer, so all
//! events carry timestamps and trace ids generated the same way.

use uuid::Uuid;

/// Returns the current Unix timestamp in milliseconds.
///
/// A clock set before the Unix epoch yields `0` rather than panicking.
pub fn current_timestamp_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Generates a fresh correlation id for [`Event::trace_id`](crate::Event::trace_id).
pub fn new_trace_id() -> String {
    Uuid::new_v4().to_string()
}
