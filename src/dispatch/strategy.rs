//! # Dispatch strategy contract.
//!
//! A [`DispatchStrategy`] converts a (listener instance, handler) pair into a
//! [`Dispatcher`]: the callable that `fire` invokes per registration. The
//! strategy decides where the type-recovery cost is paid:
//!
//! | Strategy                            | Construction            | Per call            | Private |
//! |-------------------------------------|--------------------------|---------------------|---------|
//! | [`DirectDispatch`](crate::DirectDispatch)       | cached binder artifact   | 1 event downcast    | no      |
//! | [`HandleDispatch`](crate::HandleDispatch)       | fresh binding            | 1 event downcast    | yes     |
//! | [`ReflectiveDispatch`](crate::ReflectiveDispatch) | none (shares the entry) | 2 checked downcasts | opt-in  |
//!
//! All strategies are behaviorally identical: same invocation order, same
//! failure propagation. Swapping one for another never changes what the
//! registry or the bus observe.
//!
//! ## Rules
//! - A dispatcher never swallows a handler's failure; whatever the handler
//!   returns propagates to the `fire` caller.
//! - Construction failures surface at `subscribe` time, never at `fire` time.

use std::any::Any;
use std::sync::Arc;

use crate::error::{BusError, HandlerResult};
use crate::listeners::{Binder, Handler, HandlerId, ListenerRef, Priority, Visibility};

/// Callable produced by a strategy for one registration.
///
/// Invoked by `fire` with the event instance; the bound listener is captured
/// inside. Must propagate the handler's failure unchanged.
pub type Dispatcher =
    Box<dyn Fn(&mut (dyn Any + Send + Sync)) -> HandlerResult + Send + Sync>;

/// One handler of one listener instance, as presented to a strategy.
///
/// Exposes the handler's declared metadata plus the two ways of producing a
/// dispatcher from it: [`bind`](HandlerBinding::bind) (listener resolved
/// once, at construction) and [`checked`](HandlerBinding::checked) (listener
/// resolved on every call).
pub struct HandlerBinding<'a> {
    handler: &'a Handler,
    listener: &'a ListenerRef,
}

impl<'a> HandlerBinding<'a> {
    pub(crate) fn new(handler: &'a Handler, listener: &'a ListenerRef) -> Self {
        Self { handler, listener }
    }

    /// Name of the handler, as declared in the handler table.
    #[must_use]
    pub fn handler_name(&self) -> &'static str {
        self.handler.name()
    }

    /// Type name of the event the handler accepts.
    #[must_use]
    pub fn event_type_name(&self) -> &'static str {
        self.handler.event_type_name()
    }

    /// Declared priority.
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.handler.priority()
    }

    /// Declared visibility.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.handler.visibility()
    }

    /// Builds a dispatcher with the listener bound up front.
    ///
    /// The listener downcast happens here, once; the dispatcher pays a single
    /// event downcast per call. `strategy` names the caller in the error.
    pub fn bind(&self, strategy: &'static str) -> Result<Dispatcher, BusError> {
        (self.handler.binder())(Arc::clone(self.listener)).map_err(|e| BusError::Dispatcher {
            handler: self.handler.name(),
            strategy,
            reason: e.to_string(),
        })
    }

    /// Builds a dispatcher that re-resolves listener and event on every call.
    ///
    /// Cannot fail at construction; mismatches are reported per call (and are
    /// unreachable through the bus, which routes by `TypeId`).
    #[must_use]
    pub fn checked(&self) -> Dispatcher {
        let listener = Arc::clone(self.listener);
        let call = self.handler.call();
        Box::new(move |event: &mut (dyn Any + Send + Sync)| call(listener.as_ref(), event))
    }

    pub(crate) fn handler_id(&self) -> HandlerId {
        self.handler.id()
    }

    pub(crate) fn binder(&self) -> Arc<Binder> {
        self.handler.binder()
    }

    pub(crate) fn listener(&self) -> ListenerRef {
        Arc::clone(self.listener)
    }
}

/// Pluggable invocation backend.
///
/// Strategies are substitutable without changing registry or bus behavior;
/// they trade construction cost against per-call overhead.
pub trait DispatchStrategy: Send + Sync {
    /// Human-readable strategy name, used in errors and logs.
    fn name(&self) -> &'static str;

    /// Whether dispatchers built by this strategy can invoke handlers
    /// declared [`Visibility::Private`].
    fn can_invoke_private(&self) -> bool;

    /// Produces the dispatcher for one registration.
    ///
    /// Failures are fatal for the whole `subscribe` call that triggered the
    /// registration attempt.
    fn create_dispatcher(&self, binding: &HandlerBinding<'_>) -> Result<Dispatcher, BusError>;
}
