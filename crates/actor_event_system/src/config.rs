//! Runtime configuration.
//!
//! [`RuntimeConfig`] is the serializable form embedded in host config files;
//! [`ActorConfig`] is the resolved per-actor form with real durations.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables shared by every actor a runtime spawns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Mailbox capacity used by `spawn_actor`
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
    /// Soft bound for each mailbox-delivered dispatch
    #[serde(default = "default_event_timeout_ms")]
    pub event_timeout_ms: u64,
    /// Soft bound for each event drained while an actor shuts down
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,
    /// Soft bound for `publish_local`
    #[serde(default = "default_local_publish_timeout_ms")]
    pub local_publish_timeout_ms: u64,
}

fn default_mailbox_capacity() -> usize {
    256
}

fn default_event_timeout_ms() -> u64 {
    5_000
}

fn default_drain_timeout_ms() -> u64 {
    1_000
}

fn default_local_publish_timeout_ms() -> u64 {
    3_000
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: default_mailbox_capacity(),
            event_timeout_ms: default_event_timeout_ms(),
            drain_timeout_ms: default_drain_timeout_ms(),
            local_publish_timeout_ms: default_local_publish_timeout_ms(),
        }
    }
}

impl RuntimeConfig {
    /// Resolves the per-actor settings for a mailbox of `mailbox_capacity`.
    pub fn actor_config(&self, mailbox_capacity: usize) -> ActorConfig {
        ActorConfig {
            mailbox_capacity,
            event_timeout: Duration::from_millis(self.event_timeout_ms),
            drain_timeout: Duration::from_millis(self.drain_timeout_ms),
            local_publish_timeout: Duration::from_millis(self.local_publish_timeout_ms),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.mailbox_capacity == 0 {
            return Err("mailbox_capacity must be greater than 0".to_string());
        }
        if self.event_timeout_ms == 0 {
            return Err("event_timeout_ms must be greater than 0".to_string());
        }
        if self.drain_timeout_ms == 0 {
            return Err("drain_timeout_ms must be greater than 0".to_string());
        }
        if self.local_publish_timeout_ms == 0 {
            return Err("local_publish_timeout_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Resolved settings for one actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorConfig {
    pub mailbox_capacity: usize,
    pub event_timeout: Duration,
    pub drain_timeout: Duration,
    pub local_publish_timeout: Duration,
}

impl Default for ActorConfig {
    fn default() -> Self {
        RuntimeConfig::default().actor_config(default_mailbox_capacity())
    }
}
