//! # Handler tables: the explicit registration surface of a listener type.
//!
//! A [`HandlerTable`] enumerates the handlers of one listener type `L`. Each
//! entry binds a handler function `fn(&L, &mut E) -> HandlerResult` to a
//! name, a [`Priority`], and a declared [`Visibility`]. The entry itself is
//! the subscription marker; the fn-pointer signature enforces what runtime
//! scanning would otherwise have to filter for (exactly one event parameter,
//! no meaningful return value, non-suspending).
//!
//! Entries are erased into [`Handler`] descriptors at construction, while
//! both `L` and `E` are still statically known. Two erased entry points are
//! captured per handler:
//!
//! - a *checked call* that downcasts listener and event on every invocation
//!   (used by the reflective strategy);
//! - a *binder* that downcasts the listener once, yielding a dispatcher
//!   that only downcasts the event per call (used by the handle-based and
//!   direct strategies).
//!
//! ```text
//! HandlerTable<L>
//!   .entry::<E>(name, priority, visibility, f)
//!        │
//!        ├─► checked call: Fn(&dyn Any, &mut dyn Any) ── 2 downcasts/call
//!        └─► binder: Fn(Arc<dyn Any>) ─► Dispatcher ──── 1 downcast/call
//! ```

use std::any::{Any, TypeId, type_name};
use std::marker::PhantomData;
use std::sync::Arc;

use thiserror::Error;

use crate::dispatch::Dispatcher;
use crate::error::{HandlerError, HandlerResult};
use crate::events::Event;

use super::{Listener, Priority, Visibility};

/// Shared handle to a type-erased listener instance.
pub(crate) type ListenerRef = Arc<dyn Any + Send + Sync>;

/// Fully erased handler invocation: downcasts both sides on every call.
pub(crate) type ErasedCall =
    dyn Fn(&(dyn Any + Send + Sync), &mut (dyn Any + Send + Sync)) -> HandlerResult + Send + Sync;

/// Binds a listener instance into a [`Dispatcher`], downcasting it once.
///
/// Binding fails only when handed a listener of the wrong concrete type,
/// which the bus rules out; strategies still surface it as a construction
/// error rather than panicking.
pub(crate) type Binder =
    dyn Fn(ListenerRef) -> Result<Dispatcher, HandlerError> + Send + Sync;

/// A handler function on listener type `L` for event type `E`.
pub type HandlerFn<L, E> = fn(&L, &mut E) -> HandlerResult;

/// Identity of a handler function, independent of listener instance.
///
/// Two registrations from the same listener type and the same function share
/// an id; the direct strategy keys its dispatcher cache by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct HandlerId {
    listener: TypeId,
    event: TypeId,
    callee: usize,
}

/// A downcast inside an erased entry point failed.
///
/// Unreachable through the public API (the bus routes by `TypeId`), reported
/// as an error instead of panicking.
#[derive(Debug, Error)]
#[error("{role} is not a '{expected}'")]
pub(crate) struct TypeMismatch {
    pub(crate) role: &'static str,
    pub(crate) expected: &'static str,
}

impl TypeMismatch {
    pub(crate) fn event_of<E: Event>() -> HandlerError {
        Box::new(TypeMismatch {
            role: "event",
            expected: type_name::<E>(),
        })
    }

    fn listener_of<L: Listener>() -> HandlerError {
        Box::new(TypeMismatch {
            role: "listener",
            expected: type_name::<L>(),
        })
    }
}

/// Erased descriptor of one handler table entry.
pub(crate) struct Handler {
    name: &'static str,
    priority: Priority,
    visibility: Visibility,
    event_type: TypeId,
    event_type_name: &'static str,
    id: HandlerId,
    call: Arc<ErasedCall>,
    binder: Arc<Binder>,
}

impl Handler {
    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn priority(&self) -> Priority {
        self.priority
    }

    pub(crate) fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub(crate) fn event_type(&self) -> TypeId {
        self.event_type
    }

    pub(crate) fn event_type_name(&self) -> &'static str {
        self.event_type_name
    }

    pub(crate) fn id(&self) -> HandlerId {
        self.id
    }

    pub(crate) fn call(&self) -> Arc<ErasedCall> {
        Arc::clone(&self.call)
    }

    pub(crate) fn binder(&self) -> Arc<Binder> {
        Arc::clone(&self.binder)
    }
}

/// Ordered collection of handler declarations for listener type `L`.
///
/// Built once per type in [`Listener::handlers`]; consumed by `subscribe`.
/// Declaration order is the tie-break order for equal priorities.
pub struct HandlerTable<L: ?Sized> {
    entries: Vec<Handler>,
    _marker: PhantomData<fn(&L)>,
}

impl<L: Listener> HandlerTable<L> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Declares a public handler at [`Priority::Normal`].
    #[must_use]
    pub fn handler<E: Event>(self, name: &'static str, f: HandlerFn<L, E>) -> Self {
        self.entry(name, Priority::Normal, Visibility::Public, f)
    }

    /// Declares a public handler at the given priority.
    #[must_use]
    pub fn handler_at<E: Event>(
        self,
        name: &'static str,
        priority: Priority,
        f: HandlerFn<L, E>,
    ) -> Self {
        self.entry(name, priority, Visibility::Public, f)
    }

    /// Declares a handler with explicit priority and visibility.
    ///
    /// `Private` entries are only invokable by strategies whose
    /// [`can_invoke_private`](crate::DispatchStrategy::can_invoke_private)
    /// is `true`; `subscribe` rejects them otherwise.
    #[must_use]
    pub fn entry<E: Event>(
        mut self,
        name: &'static str,
        priority: Priority,
        visibility: Visibility,
        f: HandlerFn<L, E>,
    ) -> Self {
        let call: Arc<ErasedCall> = Arc::new(
            move |listener: &(dyn Any + Send + Sync), event: &mut (dyn Any + Send + Sync)| {
                let listener = listener
                    .downcast_ref::<L>()
                    .ok_or_else(TypeMismatch::listener_of::<L>)?;
                let event = event
                    .downcast_mut::<E>()
                    .ok_or_else(TypeMismatch::event_of::<E>)?;
                f(listener, event)
            },
        );

        let binder: Arc<Binder> = Arc::new(move |instance: ListenerRef| {
            let instance = instance
                .downcast::<L>()
                .map_err(|_| TypeMismatch::listener_of::<L>())?;
            let dispatcher: Dispatcher =
                Box::new(move |event: &mut (dyn Any + Send + Sync)| {
                    let event = event
                        .downcast_mut::<E>()
                        .ok_or_else(TypeMismatch::event_of::<E>)?;
                    f(instance.as_ref(), event)
                });
            Ok(dispatcher)
        });

        self.entries.push(Handler {
            name,
            priority,
            visibility,
            event_type: TypeId::of::<E>(),
            event_type_name: type_name::<E>(),
            id: HandlerId {
                listener: TypeId::of::<L>(),
                event: TypeId::of::<E>(),
                callee: f as usize,
            },
            call,
            binder,
        });
        self
    }

    /// Number of declared handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no handlers are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> Vec<Handler> {
        self.entries
    }
}

impl<L: Listener> Default for HandlerTable<L> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping;
    impl Event for Ping {}

    struct Pong;
    impl Event for Pong {}

    struct Paddle;

    impl Paddle {
        fn on_ping(&self, _event: &mut Ping) -> HandlerResult {
            Ok(())
        }

        fn on_pong(&self, _event: &mut Pong) -> HandlerResult {
            Ok(())
        }
    }

    impl Listener for Paddle {
        fn handlers() -> HandlerTable<Self> {
            HandlerTable::new()
                .handler("on_ping", Self::on_ping)
                .entry("on_pong", Priority::High, Visibility::Private, Self::on_pong)
        }
    }

    #[test]
    fn test_table_records_declaration_metadata() {
        let entries = Paddle::handlers().into_entries();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].name(), "on_ping");
        assert_eq!(entries[0].priority(), Priority::Normal);
        assert_eq!(entries[0].visibility(), Visibility::Public);
        assert_eq!(entries[0].event_type(), TypeId::of::<Ping>());

        assert_eq!(entries[1].priority(), Priority::High);
        assert_eq!(entries[1].visibility(), Visibility::Private);
        assert_eq!(entries[1].event_type(), TypeId::of::<Pong>());
    }

    #[test]
    fn test_handler_id_stable_across_table_builds() {
        let first = Paddle::handlers().into_entries();
        let second = Paddle::handlers().into_entries();
        assert_eq!(first[0].id(), second[0].id());
        assert_ne!(first[0].id(), first[1].id());
    }

    #[test]
    fn test_checked_call_reports_event_mismatch() {
        let entries = Paddle::handlers().into_entries();
        let listener = Paddle;
        let mut wrong = Pong;

        let err = (entries[0].call())(&listener, &mut wrong).unwrap_err();
        assert!(err.downcast_ref::<TypeMismatch>().is_some());
    }

    #[test]
    fn test_binder_rejects_foreign_listener() {
        struct Stranger;

        let entries = Paddle::handlers().into_entries();
        let stranger: ListenerRef = Arc::new(Stranger);
        assert!((entries[0].binder())(stranger).is_err());
    }
}
