//! Handler trait and its trivial variants

use super::event::Event;
use std::sync::Arc;

/// The capability implemented by event consumers: sinks, fan-outs, and
/// transform-then-forward routers.
pub trait Handler: Send + Sync {
    /// Consume one event.
    ///
    /// The event is only valid for the duration of this call; its backing
    /// buffers are reused by the logger afterwards. A handler that needs
    /// to keep the event must clone it.
    ///
    /// Handlers writing to a shared sink are responsible for serializing
    /// their own writes; the core takes no lock around this call.
    fn handle_event(&self, event: &Event);
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn handle_event(&self, event: &Event) {
        (**self).handle_event(event)
    }
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn handle_event(&self, event: &Event) {
        (**self).handle_event(event)
    }
}

/// A handler that does nothing with the events it receives.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl Handler for Discard {
    fn handle_event(&self, _event: &Event) {}
}

/// Adapts a plain function or closure into a handler.
pub struct HandlerFn<F>(pub F);

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&Event) + Send + Sync,
{
    fn handle_event(&self, event: &Event) {
        (self.0)(event)
    }
}

/// Fans events out to an ordered, immutable list of handlers.
///
/// Sub-handlers run synchronously on the calling thread, in list order. A
/// panicking sub-handler propagates and the rest of the list is not
/// invoked; callers needing isolation must wrap sub-handlers themselves.
pub struct MultiHandler {
    handlers: Vec<Box<dyn Handler>>,
}

impl MultiHandler {
    pub fn new(handlers: Vec<Box<dyn Handler>>) -> Self {
        Self { handlers }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Handler for MultiHandler {
    fn handle_event(&self, event: &Event) {
        for handler in &self.handlers {
            handler.handle_event(event);
        }
    }
}

impl From<Vec<Box<dyn Handler>>> for MultiHandler {
    fn from(handlers: Vec<Box<dyn Handler>>) -> Self {
        Self::new(handlers)
    }
}
