//! # Event Bus
//!
//! A keyed, multi-subscriber dispatcher with two dispatch modes and
//! replay-based cloning.
//!
//! ## Dispatch modes
//!
//! - [`EventBus::publish`] - handlers run one at a time in descending priority
//!   (registration order for ties). The first failure stops the dispatch and
//!   is returned to the caller.
//! - [`EventBus::publish_async`] - one task per handler, no ordering, failures
//!   are only logged.
//!
//! ## Cloning
//!
//! Every `subscribe` and `unsubscribe` is appended to a replay log of
//! [`ReplayEntry`] values. [`EventBus::clone_by_replay`] builds a fresh bus by
//! re-applying that log in order. The runtime keeps one template bus and gives
//! every actor its own replayed copy.

mod core;
mod dispatch;
mod replay;
mod stats;
mod tests;

pub use self::core::EventBus;
pub use replay::{ReplayEntry, SubscriptionRecord};
pub use stats::BusStats;
