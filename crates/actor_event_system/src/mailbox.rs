//! # Mailbox
//!
//! Bounded, per-actor event queue over a Tokio mpsc channel. Producers only
//! ever use [`Mailbox::try_send`]: a full or closed mailbox refuses the event
//! immediately instead of blocking the producer.

use crate::error::MailboxError;
use crate::event::Event;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Creates a mailbox holding at most `capacity` events.
///
/// A capacity of `0` is treated as `1`.
pub fn mailbox(capacity: usize) -> (Mailbox, MailboxReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (Mailbox { tx }, MailboxReceiver { rx })
}

/// Sending half. Cheap to clone; every clone feeds the same queue.
#[derive(Debug, Clone)]
pub struct Mailbox {
    tx: mpsc::Sender<Arc<Event>>,
}

impl Mailbox {
    /// Enqueues without waiting.
    pub fn try_send(&self, event: impl Into<Arc<Event>>) -> Result<(), MailboxError> {
        self.tx.try_send(event.into()).map_err(|error| match error {
            mpsc::error::TrySendError::Full(_) => MailboxError::Full,
            mpsc::error::TrySendError::Closed(_) => MailboxError::Closed,
        })
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Events currently buffered.
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` once the receiving side has been closed or dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Whether both handles feed the same queue.
    pub fn same_mailbox(&self, other: &Mailbox) -> bool {
        self.tx.same_channel(&other.tx)
    }
}

/// Receiving half, owned by exactly one processing task.
#[derive(Debug)]
pub struct MailboxReceiver {
    rx: mpsc::Receiver<Arc<Event>>,
}

impl MailboxReceiver {
    /// Waits for the next event; `None` once closed and empty.
    pub async fn recv(&mut self) -> Option<Arc<Event>> {
        self.rx.recv().await
    }

    /// Next buffered event, without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<Event>> {
        self.rx.try_recv().ok()
    }

    /// Refuses further sends. Already-buffered events stay receivable.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
