//! # Actor Registry
//!
//! Directory from actor id to [`Mailbox`], used for broadcast and targeted
//! delivery without holding actor references.
//!
//! The lock is only held to mutate the map or to copy out a snapshot of
//! mailboxes; sends always happen after it is released. All sends are
//! non-blocking, a full mailbox loses the event for that actor only.

use crate::event::Event;
use crate::mailbox::Mailbox;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, trace};

#[derive(Debug, Default)]
struct RegistryInner {
    actors: HashMap<String, Mailbox>,
    closed: bool,
}

/// Process-wide (or runtime-wide) id → mailbox map.
#[derive(Debug, Default)]
pub struct ActorRegistry {
    inner: RwLock<RegistryInner>,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

/// Delivery counters since the registry was created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub registered: usize,
    pub delivered: u64,
    pub dropped: u64,
    pub closed: bool,
}

impl ActorRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Maps `id` to `mailbox`, replacing any previous mailbox for that id.
    ///
    /// The returned [`Unregister`] removes this mapping and nothing else. On a
    /// closed registry nothing is stored and the handle is inert.
    pub fn register(self: &Arc<Self>, id: impl Into<String>, mailbox: Mailbox) -> Unregister {
        let id = id.into();
        let mut inner = self.inner.write();
        if inner.closed {
            debug!(actor_id = %id, "Registry closed, registration ignored");
            return Unregister::inert(id);
        }

        if inner.actors.insert(id.clone(), mailbox.clone()).is_some() {
            debug!(actor_id = %id, "Replaced existing mailbox registration");
        }

        Unregister {
            registry: Arc::downgrade(self),
            id,
            mailbox: Some(mailbox),
            done: AtomicBool::new(false),
        }
    }

    fn remove_if_same(&self, id: &str, mailbox: &Mailbox) -> bool {
        let mut inner = self.inner.write();
        match inner.actors.get(id) {
            Some(current) if current.same_mailbox(mailbox) => {
                inner.actors.remove(id);
                true
            }
            _ => false,
        }
    }

    /// Offers `event` to every registered mailbox. Returns how many accepted it.
    pub fn broadcast(&self, event: impl Into<Arc<Event>>) -> usize {
        let event = event.into();
        let targets: Vec<(String, Mailbox)> = {
            let inner = self.inner.read();
            inner
                .actors
                .iter()
                .map(|(id, mailbox)| (id.clone(), mailbox.clone()))
                .collect()
        };

        let delivered = self.deliver(&event, targets);
        trace!(event_type = %event.event_type, delivered, "Broadcast complete");
        delivered
    }

    /// Like [`broadcast`](Self::broadcast), restricted to `ids`. Unknown ids
    /// are skipped.
    pub fn broadcast_to_actors<I, S>(&self, event: impl Into<Arc<Event>>, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let event = event.into();
        let targets: Vec<(String, Mailbox)> = {
            let inner = self.inner.read();
            ids.into_iter()
                .filter_map(|id| {
                    let id = id.as_ref();
                    inner
                        .actors
                        .get(id)
                        .map(|mailbox| (id.to_string(), mailbox.clone()))
                })
                .collect()
        };

        self.deliver(&event, targets)
    }

    /// Single-target send. `false` when the id is unknown or its mailbox
    /// refused the event.
    pub fn send_to_actor(&self, id: &str, event: impl Into<Arc<Event>>) -> bool {
        let Some(mailbox) = self.inner.read().actors.get(id).cloned() else {
            return false;
        };

        self.deliver(&event.into(), vec![(id.to_string(), mailbox)]) == 1
    }

    fn deliver(&self, event: &Arc<Event>, targets: Vec<(String, Mailbox)>) -> usize {
        let mut delivered = 0;
        for (id, mailbox) in targets {
            match mailbox.try_send(Arc::clone(event)) {
                Ok(()) => delivered += 1,
                Err(reason) => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        actor_id = %id,
                        event_type = %event.event_type,
                        %reason,
                        "Event dropped"
                    );
                }
            }
        }
        self.delivered.fetch_add(delivered as u64, Ordering::Relaxed);
        delivered
    }

    /// Detaches every actor at once and refuses future registrations.
    ///
    /// Mailboxes themselves are left alone; their owners close them.
    pub fn close(&self) {
        let mut inner = self.inner.write();
        inner.closed = true;
        let detached = std::mem::take(&mut inner.actors);
        info!(detached = detached.len(), "Actor registry closed");
    }

    pub fn is_closed(&self) -> bool {
        self.inner.read().closed
    }

    pub fn has_actor(&self, id: &str) -> bool {
        self.inner.read().actors.contains_key(id)
    }

    pub fn actor_count(&self) -> usize {
        self.inner.read().actors.len()
    }

    pub fn actor_ids(&self) -> Vec<String> {
        self.inner.read().actors.keys().cloned().collect()
    }

    pub fn stats(&self) -> RegistryStats {
        let inner = self.inner.read();
        RegistryStats {
            registered: inner.actors.len(),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            closed: inner.closed,
        }
    }
}

/// Removes one registration. Calling it again is a no-op.
#[derive(Debug)]
pub struct Unregister {
    registry: Weak<ActorRegistry>,
    id: String,
    mailbox: Option<Mailbox>,
    done: AtomicBool,
}

impl Unregister {
    fn inert(id: String) -> Self {
        Self {
            registry: Weak::new(),
            id,
            mailbox: None,
            done: AtomicBool::new(true),
        }
    }

    pub fn actor_id(&self) -> &str {
        &self.id
    }

    /// `false` if registration was refused by a closed registry.
    pub fn is_registered(&self) -> bool {
        self.mailbox.is_some()
    }

    pub fn unregister(&self) {
        if self.done.swap(true, Ordering::AcqRel) {
            return;
        }
        let (Some(registry), Some(mailbox)) = (self.registry.upgrade(), self.mailbox.as_ref())
        else {
            return;
        };
        if registry.remove_if_same(&self.id, mailbox) {
            debug!(actor_id = %self.id, "Actor unregistered");
        }
    }
}
