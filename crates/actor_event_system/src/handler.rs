//! # Event Handlers
//!
//! [`EventHandler`] is the object-safe handler abstraction stored in every
//! [`EventBus`](crate::EventBus). Most call sites never implement it directly;
//! they hand a closure to `subscribe` / `subscribe_async` and the bus wraps it
//! in one of the adapters below.
//!
//! - [`FnHandler`] - synchronous closure, runs inline on the dispatching task
//! - [`AsyncFnHandler`] - closure returning a future over an owned context and
//!   a shallow clone of the event

use crate::context::EventContext;
use crate::error::EventError;
use crate::event::Event;
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;

/// A subscriber callback.
///
/// Returning an error from a handler invoked through
/// [`EventBus::publish`](crate::EventBus::publish) stops dispatch of that event
/// to every lower-priority handler.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn handle(&self, ctx: &EventContext, event: &Event) -> Result<(), EventError>;

    /// Human-readable name used in logs.
    fn handler_name(&self) -> &str;
}

/// Adapter for synchronous closures.
///
/// ```rust
/// use actor_event_system::{Event, EventContext, FnHandler};
///
/// let handler = FnHandler::new("log_everything", |_ctx: &EventContext, event: &Event| {
///     println!("saw {}", event.event_type);
///     Ok(())
/// });
/// # let _ = handler;
/// ```
pub struct FnHandler<F> {
    name: String,
    handler: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&EventContext, &Event) -> Result<(), EventError> + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> std::fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&EventContext, &Event) -> Result<(), EventError> + Send + Sync + 'static,
{
    async fn handle(&self, ctx: &EventContext, event: &Event) -> Result<(), EventError> {
        (self.handler)(ctx, event)
    }

    fn handler_name(&self) -> &str {
        &self.name
    }
}

/// Adapter for closures that return a future.
///
/// The closure receives its own [`EventContext`] clone and a shallow clone of
/// the event so the returned future can be `'static`.
pub struct AsyncFnHandler<F, Fut> {
    name: String,
    handler: F,
    _future: PhantomData<fn() -> Fut>,
}

impl<F, Fut> AsyncFnHandler<F, Fut>
where
    F: Fn(EventContext, Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), EventError>> + Send + 'static,
{
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
            _future: PhantomData,
        }
    }
}

impl<F, Fut> std::fmt::Debug for AsyncFnHandler<F, Fut> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncFnHandler").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F, Fut> EventHandler for AsyncFnHandler<F, Fut>
where
    F: Fn(EventContext, Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), EventError>> + Send + 'static,
{
    async fn handle(&self, ctx: &EventContext, event: &Event) -> Result<(), EventError> {
        (self.handler)(ctx.clone(), event.clone()).await
    }

    fn handler_name(&self) -> &str {
        &self.name
    }
}

/// Default handler name for closures: the closure's type name.
pub(crate) fn closure_name<F>() -> String {
    std::any::type_name::<F>().to_string()
}
