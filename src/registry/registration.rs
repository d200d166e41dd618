//! # Registration: one listener instance bound to one handler.
//!
//! Immutable after creation. A registration pairs the handler's declared
//! metadata (event type, priority, name) with the dispatcher the active
//! strategy produced for this particular listener instance.
//!
//! Identity, not value, distinguishes registrations: the listener is
//! identified by the address of its shared allocation, the handler by its
//! function identity. Subscribing the same instance twice therefore yields
//! two registrations, and a fire invokes the handler twice; deduplication is
//! the caller's decision, not the registry's.

use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::dispatch::Dispatcher;
use crate::error::HandlerResult;
use crate::listeners::{Handler, ListenerRef, Priority};

/// Address-based identity of a listener instance.
///
/// Stable for the lifetime of the shared allocation; the bus keeps the
/// listener alive for as long as any registration references it.
pub(crate) fn listener_addr<T: ?Sized>(listener: &Arc<T>) -> usize {
    Arc::as_ptr(listener).cast::<()>() as usize
}

/// Immutable binding of a listener instance to one of its handlers.
pub(crate) struct Registration {
    /// Keeps the listener alive; identity derives from its address.
    listener: ListenerRef,
    handler_name: &'static str,
    event_type: TypeId,
    priority: Priority,
    dispatcher: Dispatcher,
}

impl Registration {
    pub(crate) fn new(listener: ListenerRef, handler: &Handler, dispatcher: Dispatcher) -> Self {
        Self {
            listener,
            handler_name: handler.name(),
            event_type: handler.event_type(),
            priority: handler.priority(),
            dispatcher,
        }
    }

    /// Invokes the bound handler with the event.
    pub(crate) fn dispatch(&self, event: &mut (dyn Any + Send + Sync)) -> HandlerResult {
        (self.dispatcher)(event)
    }

    pub(crate) fn handler_name(&self) -> &'static str {
        self.handler_name
    }

    pub(crate) fn event_type(&self) -> TypeId {
        self.event_type
    }

    pub(crate) fn priority(&self) -> Priority {
        self.priority
    }

    pub(crate) fn listener_id(&self) -> usize {
        listener_addr(&self.listener)
    }
}
