//! # EventBus: the public entry point.
//!
//! [`EventBus`] owns one [`Registry`] per concrete event type plus a list of
//! ad-hoc closures per event type, and routes `fire` calls through both.
//!
//! ## Architecture
//! ```text
//! subscribe(listener) ──► HandlerTable ──► strategy.create_dispatcher()
//!                                              │
//!                                              ▼
//!                        Registry[TypeId] ◄── Registration
//!
//! fire(event) ──► Registry[TypeId].ordered_view() ── priority order
//!                        │
//!                        ▼ (after all registrations)
//!                 ad-hoc closures ────────────────── insertion order
//! ```
//!
//! ## Rules
//! - Dispatch is by the event's exact concrete type; supertypes never match.
//! - Registry handlers run in ascending priority (ties: registration order),
//!   then ad-hoc closures run in insertion order.
//! - Fail-fast: the first failure aborts the remaining handlers of that
//!   `fire` call and propagates to the caller with the original error intact.
//! - All operations may be called concurrently from any thread; no lock is
//!   held while a handler or closure runs, so handlers may re-enter the bus.
//! - The blocking and suspending `fire` variants produce identical ordering
//!   and failure propagation; they differ only in how suspending ad-hoc
//!   closures are driven.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventbus::{Event, EventBus, HandlerResult, HandlerTable, Listener};
//!
//! struct Greet {
//!     message: String,
//! }
//! impl Event for Greet {}
//!
//! struct Greeter;
//! impl Greeter {
//!     fn on_greet(&self, event: &mut Greet) -> HandlerResult {
//!         event.message.push_str(", world");
//!         Ok(())
//!     }
//! }
//! impl Listener for Greeter {
//!     fn handlers() -> HandlerTable<Self> {
//!         HandlerTable::new().handler("on_greet", Self::on_greet)
//!     }
//! }
//!
//! # fn main() -> Result<(), eventbus::BusError> {
//! let bus = EventBus::new();
//! let greeter = Arc::new(Greeter);
//! bus.subscribe(&greeter)?;
//!
//! let event = bus.fire(Greet { message: "hello".into() })?;
//! assert_eq!(event.message, "hello, world");
//!
//! assert!(bus.unsubscribe(&greeter));
//! assert!(!bus.is_subscribed(&greeter));
//! # Ok(())
//! # }
//! ```

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use futures::FutureExt;
use futures::future::{self, BoxFuture};

use crate::dispatch::{DirectDispatch, DispatchStrategy, HandlerBinding};
use crate::error::{BusError, HandlerResult};
use crate::events::Event;
use crate::listeners::{Listener, ListenerRef, TypeMismatch, Visibility};
use crate::registry::{Registration, Registry, listener_addr};

/// Erased non-suspending ad-hoc closure.
type SyncClosure = Box<dyn Fn(&mut (dyn Any + Send + Sync)) -> HandlerResult + Send + Sync>;

/// Erased suspending ad-hoc closure.
type SuspendClosure = Box<
    dyn for<'a> Fn(&'a mut (dyn Any + Send + Sync)) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync,
>;

/// Ad-hoc subscription registered via [`EventBus::on`] / [`EventBus::on_async`].
enum AdHoc {
    Sync(SyncClosure),
    Suspend(SuspendClosure),
}

/// Pins the higher-ranked signature onto an erasing closure; plain inference
/// does not produce the `for<'a>` bound on its own.
fn suspend_closure<F>(f: F) -> F
where
    F: for<'a> Fn(&'a mut (dyn Any + Send + Sync)) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    f
}

/// In-process publish-subscribe dispatcher.
///
/// Cheap to share behind an `Arc`; all methods take `&self` and are safe to
/// call concurrently. See the [module docs](self) for ordering and failure
/// semantics.
pub struct EventBus {
    strategy: Arc<dyn DispatchStrategy>,
    registries: RwLock<HashMap<TypeId, Arc<Registry>>>,
    closures: RwLock<HashMap<TypeId, Vec<Arc<AdHoc>>>>,
}

impl EventBus {
    /// Creates a bus with the default [`DirectDispatch`] strategy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_strategy(DirectDispatch::new())
    }

    /// Creates a bus with an explicit dispatch strategy.
    ///
    /// The strategy instance is owned by the bus; any state it keeps (such
    /// as the direct strategy's dispatcher cache) is scoped to this bus.
    #[must_use]
    pub fn with_strategy<S: DispatchStrategy + 'static>(strategy: S) -> Self {
        Self {
            strategy: Arc::new(strategy),
            registries: RwLock::new(HashMap::new()),
            closures: RwLock::new(HashMap::new()),
        }
    }

    /// The active dispatch strategy.
    #[must_use]
    pub fn strategy(&self) -> &dyn DispatchStrategy {
        self.strategy.as_ref()
    }

    /// Registers every handler declared by `L`'s handler table for this
    /// listener instance.
    ///
    /// The whole table is validated against the strategy's visibility rules
    /// and every dispatcher is constructed before anything is inserted: a
    /// listener is registered in full or not at all.
    ///
    /// Subscribing the same instance twice registers its handlers twice and
    /// a fire then invokes them twice; deduplicate at the call site if that
    /// is not what you want.
    pub fn subscribe<L: Listener>(&self, listener: &Arc<L>) -> Result<(), BusError> {
        let entries = L::handlers().into_entries();

        for handler in &entries {
            if handler.visibility() == Visibility::Private && !self.strategy.can_invoke_private() {
                return Err(BusError::DisallowedVisibility {
                    handler: handler.name(),
                    declared: handler.visibility(),
                    strategy: self.strategy.name(),
                });
            }
        }

        // `.clone()` (not `Arc::clone`) so the unsizing coercion to
        // `Arc<dyn Any + Send + Sync>` applies to the returned `Arc<L>`.
        let instance: ListenerRef = listener.clone();
        let mut pending = Vec::with_capacity(entries.len());
        for handler in &entries {
            let binding = HandlerBinding::new(handler, &instance);
            let dispatcher = self.strategy.create_dispatcher(&binding)?;
            pending.push(Arc::new(Registration::new(
                Arc::clone(&instance),
                handler,
                dispatcher,
            )));
        }

        for registration in pending {
            let event_type = registration.event_type();
            self.registry_for(event_type).insert(registration);
        }

        tracing::debug!(
            listener = type_name::<L>(),
            handlers = entries.len(),
            strategy = self.strategy.name(),
            "listener subscribed"
        );
        Ok(())
    }

    /// Removes every registration of this listener instance.
    ///
    /// Returns `false` if the listener had no presence on the bus; that is
    /// not an error.
    pub fn unsubscribe<L: Listener>(&self, listener: &Arc<L>) -> bool {
        let id = listener_addr(listener);
        if !self.is_present(id) {
            return false;
        }

        let entries = L::handlers().into_entries();
        let registries = self
            .registries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for handler in &entries {
            if let Some(registry) = registries.get(&handler.event_type()) {
                registry.remove_if(|r| r.listener_id() == id);
            }
        }

        tracing::debug!(listener = type_name::<L>(), "listener unsubscribed");
        true
    }

    /// True if any registry holds a registration for this listener instance.
    #[must_use]
    pub fn is_subscribed<L: Listener>(&self, listener: &Arc<L>) -> bool {
        self.is_present(listener_addr(listener))
    }

    /// Registers a non-suspending closure for events of type `E`.
    ///
    /// Ad-hoc closures run after all registry handlers for the event, in
    /// insertion order, with no priority applied.
    pub fn on<E, F>(&self, closure: F)
    where
        E: Event,
        F: Fn(&mut E) -> HandlerResult + Send + Sync + 'static,
    {
        let erased: SyncClosure =
            Box::new(move |event: &mut (dyn Any + Send + Sync)| match event.downcast_mut::<E>() {
                Some(event) => closure(event),
                None => Err(TypeMismatch::event_of::<E>()),
            });
        self.push_adhoc::<E>(AdHoc::Sync(erased));
    }

    /// Registers a suspending closure for events of type `E`.
    ///
    /// The closure returns a boxed future borrowing the event. Closure
    /// inference does not generalize over that borrow on its own, so pass a
    /// function item when the future touches the event:
    ///
    /// ```rust
    /// use eventbus::{Event, EventBus, HandlerResult};
    /// use futures::FutureExt;
    /// use futures::future::BoxFuture;
    ///
    /// struct Saved {
    ///     path: String,
    /// }
    /// impl Event for Saved {}
    ///
    /// fn log_save(event: &mut Saved) -> BoxFuture<'_, HandlerResult> {
    ///     async move {
    ///         event.path.push_str(".bak");
    ///         Ok(())
    ///     }
    ///     .boxed()
    /// }
    ///
    /// let bus = EventBus::new();
    /// bus.on_async(log_save);
    /// ```
    ///
    /// Suspending closures only actually yield inside
    /// [`fire_async`](Self::fire_async); the blocking [`fire`](Self::fire)
    /// drives them to completion on the calling thread.
    pub fn on_async<E, F>(&self, closure: F)
    where
        E: Event,
        F: for<'a> Fn(&'a mut E) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
    {
        let erased: SuspendClosure = Box::new(suspend_closure(
            move |event: &mut (dyn Any + Send + Sync)| match event.downcast_mut::<E>() {
                Some(event) => closure(event),
                None => future::ready(Err(TypeMismatch::event_of::<E>())).boxed(),
            },
        ));
        self.push_adhoc::<E>(AdHoc::Suspend(erased));
    }

    /// Fires an event, blocking until every matching handler and closure has
    /// run (or until the first failure).
    ///
    /// Returns the event instance back for chaining and inspection.
    pub fn fire<E: Event>(&self, mut event: E) -> Result<E, BusError> {
        self.dispatch_registrations(&mut event)?;
        for adhoc in self.adhoc_snapshot::<E>() {
            let result = match adhoc.as_ref() {
                AdHoc::Sync(f) => f(&mut event),
                AdHoc::Suspend(f) => futures::executor::block_on(f(&mut event)),
            };
            result.map_err(|source| BusError::Closure {
                event: type_name::<E>(),
                source,
            })?;
        }
        Ok(event)
    }

    /// Suspending form of [`fire`](Self::fire): identical ordering and
    /// failure propagation, but the calling task may yield while suspending
    /// ad-hoc closures run.
    pub async fn fire_async<E: Event>(&self, mut event: E) -> Result<E, BusError> {
        self.dispatch_registrations(&mut event)?;
        for adhoc in self.adhoc_snapshot::<E>() {
            let result = match adhoc.as_ref() {
                AdHoc::Sync(f) => f(&mut event),
                AdHoc::Suspend(f) => f(&mut event).await,
            };
            result.map_err(|source| BusError::Closure {
                event: type_name::<E>(),
                source,
            })?;
        }
        Ok(event)
    }

    /// Runs the registry handlers for `E` in priority order, fail-fast.
    fn dispatch_registrations<E: Event>(&self, event: &mut E) -> Result<(), BusError> {
        let registry = self
            .registries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<E>())
            .cloned();
        let Some(registry) = registry else {
            return Ok(());
        };

        let view = registry.ordered_view();
        tracing::trace!(
            event = type_name::<E>(),
            handlers = view.len(),
            "dispatching event"
        );
        for registration in view.iter() {
            registration
                .dispatch(event)
                .map_err(|source| BusError::Handler {
                    handler: registration.handler_name(),
                    event: type_name::<E>(),
                    source,
                })?;
        }
        Ok(())
    }

    /// The registry for an event type, created on first registration and
    /// retained for the bus's lifetime even when emptied.
    fn registry_for(&self, event_type: TypeId) -> Arc<Registry> {
        if let Some(registry) = self
            .registries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&event_type)
        {
            return Arc::clone(registry);
        }
        let mut registries = self
            .registries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            registries
                .entry(event_type)
                .or_insert_with(|| Arc::new(Registry::new())),
        )
    }

    fn is_present(&self, listener_id: usize) -> bool {
        self.registries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .any(|registry| registry.contains_listener(listener_id))
    }

    fn push_adhoc<E: Event>(&self, adhoc: AdHoc) {
        self.closures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Arc::new(adhoc));
    }

    /// Snapshot of the ad-hoc closures for `E`, in insertion order.
    ///
    /// Taken up front so no lock is held while closures run.
    fn adhoc_snapshot<E: Event>(&self) -> Vec<Arc<AdHoc>> {
        self.closures
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<E>())
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
