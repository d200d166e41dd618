//! # Registry: the per-event-type ordered view of registrations.
//!
//! One registry exists per concrete event type ever subscribed to; it is
//! created on first registration and retained for the bus's lifetime even
//! when emptied. Internally it keeps:
//!
//! - a **live list** in insertion order (the mutation target),
//! - a **sorted cache** (the dispatch source), rebuilt lazily,
//! - a **sticky dirty flag** connecting the two.
//!
//! ```text
//! insert/remove ──► live list ──► dirty = true
//!                                     │
//! ordered_view() ◄── cache ◄── rebuild (stable sort by priority)
//! ```
//!
//! ## Rules
//! - The cache, when clean, equals the live list stably sorted by ascending
//!   priority; ties keep insertion order.
//! - Any mutation sets the dirty flag *after* mutating, so a rebuild that
//!   raced it either saw the mutation or leaves the flag set and the next
//!   `ordered_view` rebuilds again.
//! - At most one rebuild runs at a time: the flag is claimed and the new
//!   cache stored under one hold of the cache write lock, so a finished
//!   rebuild is never overwritten by a staler one. Readers observe either
//!   the previous or the new cache, never a torn one (the cache is swapped
//!   as a whole `Arc`).
//! - Dispatch iterates a returned snapshot, so no registry lock is held
//!   while handlers run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::Registration;

/// Priority-ordered, invalidation-cached set of registrations for one
/// concrete event type.
pub(crate) struct Registry {
    live: Mutex<Vec<Arc<Registration>>>,
    cache: RwLock<Arc<[Arc<Registration>]>>,
    dirty: AtomicBool,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            live: Mutex::new(Vec::new()),
            cache: RwLock::new(Arc::from(Vec::new())),
            dirty: AtomicBool::new(false),
        }
    }

    /// Adds a registration and invalidates the cache.
    ///
    /// No deduplication: inserting an identity-equal registration twice
    /// yields two entries, and a fire invokes it twice.
    pub(crate) fn insert(&self, registration: Arc<Registration>) {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(registration);
        self.dirty.store(true, Ordering::Release);
    }

    /// Removes all registrations matching the predicate.
    ///
    /// Invalidates the cache only when something was actually removed.
    /// Returns the number of removed registrations.
    pub(crate) fn remove_if<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Registration) -> bool,
    {
        let removed = {
            let mut live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
            let before = live.len();
            live.retain(|r| !predicate(r));
            before - live.len()
        };
        if removed > 0 {
            self.dirty.store(true, Ordering::Release);
        }
        removed
    }

    /// True if any registration belongs to the listener with this identity.
    pub(crate) fn contains_listener(&self, listener_id: usize) -> bool {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|r| r.listener_id() == listener_id)
    }

    /// Returns the priority-ordered registrations, rebuilding the cache if a
    /// mutation invalidated it.
    ///
    /// The returned snapshot is immutable; dispatch iterates it without
    /// holding any registry lock.
    pub(crate) fn ordered_view(&self) -> Arc<[Arc<Registration>]> {
        if self.dirty.load(Ordering::Acquire) {
            // The whole claim-snapshot-sort-store sequence runs under the
            // cache write lock, so at most one rebuild executes at a time
            // and a rebuilt cache is never overwritten by a staler snapshot.
            let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
            // Re-check under the lock: a rebuild that won the lock first may
            // already have cleared the flag.
            if self.dirty.swap(false, Ordering::AcqRel) {
                let mut sorted = self
                    .live
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();
                // Stable sort: equal priorities keep insertion order.
                sorted.sort_by_key(|r| r.priority());
                *cache = Arc::from(sorted);
            }
            return Arc::clone(&cache);
        }
        Arc::clone(&self.cache.read().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use crate::dispatch::{DispatchStrategy, HandleDispatch, HandlerBinding};
    use crate::error::HandlerResult;
    use crate::events::Event;
    use crate::listeners::{HandlerTable, Listener, ListenerRef, Priority};
    use crate::registry::listener_addr;

    use super::*;

    struct Probe;
    impl Event for Probe {}

    struct Sensor;

    impl Sensor {
        fn low(&self, _event: &mut Probe) -> HandlerResult {
            Ok(())
        }

        fn normal(&self, _event: &mut Probe) -> HandlerResult {
            Ok(())
        }

        fn high(&self, _event: &mut Probe) -> HandlerResult {
            Ok(())
        }
    }

    impl Listener for Sensor {
        fn handlers() -> HandlerTable<Self> {
            HandlerTable::new()
                .handler_at("high", Priority::High, Self::high)
                .handler_at("low", Priority::Low, Self::low)
                .handler("normal", Self::normal)
        }
    }

    fn registrations() -> (ListenerRef, Vec<Arc<Registration>>) {
        let strategy = HandleDispatch::new();
        let listener: ListenerRef = Arc::new(Sensor);
        let regs = Sensor::handlers()
            .into_entries()
            .iter()
            .map(|handler| {
                let dispatcher = strategy
                    .create_dispatcher(&HandlerBinding::new(handler, &listener))
                    .unwrap();
                Arc::new(Registration::new(Arc::clone(&listener), handler, dispatcher))
            })
            .collect();
        (listener, regs)
    }

    #[test]
    fn test_ordered_view_sorts_by_ascending_priority() {
        let registry = Registry::new();
        let (_listener, regs) = registrations();
        for reg in regs {
            registry.insert(reg);
        }

        let view = registry.ordered_view();
        let names: Vec<&str> = view.iter().map(|r| r.handler_name()).collect();
        assert_eq!(names, ["low", "normal", "high"]);
    }

    #[test]
    fn test_equal_priorities_keep_insertion_order() {
        let registry = Registry::new();
        let (listener, _) = registrations();
        let strategy = HandleDispatch::new();

        // Insert the same Normal handler three times; order must persist.
        let entries = Sensor::handlers().into_entries();
        let normal = &entries[2];
        for _ in 0..3 {
            let dispatcher = strategy
                .create_dispatcher(&HandlerBinding::new(normal, &listener))
                .unwrap();
            registry.insert(Arc::new(Registration::new(
                Arc::clone(&listener),
                normal,
                dispatcher,
            )));
        }

        let view = registry.ordered_view();
        assert_eq!(view.len(), 3);
        for pair in view.windows(2) {
            assert_eq!(pair[0].priority(), pair[1].priority());
        }
    }

    #[test]
    fn test_dirty_flag_is_sticky_across_mutations() {
        let registry = Registry::new();
        let (_listener, regs) = registrations();

        registry.insert(Arc::clone(&regs[0]));
        assert_eq!(registry.ordered_view().len(), 1);

        // Clean cache: a view without mutation must not rebuild differently.
        assert_eq!(registry.ordered_view().len(), 1);

        registry.insert(Arc::clone(&regs[1]));
        assert_eq!(registry.ordered_view().len(), 2);
    }

    #[test]
    fn test_remove_if_marks_dirty_only_on_shrink() {
        let registry = Registry::new();
        let (listener, regs) = registrations();
        let id = listener_addr(&listener);
        for reg in regs {
            registry.insert(reg);
        }
        assert_eq!(registry.ordered_view().len(), 3);

        // No match: nothing removed, cache stays valid.
        assert_eq!(registry.remove_if(|r| r.listener_id() == id + 1), 0);
        assert!(!registry.dirty.load(Ordering::Acquire));

        assert_eq!(registry.remove_if(|r| r.listener_id() == id), 3);
        assert!(registry.ordered_view().is_empty());
    }

    #[test]
    fn test_racing_rebuilds_never_lose_an_insert() {
        let registry = Registry::new();
        let strategy = HandleDispatch::new();
        let listener: ListenerRef = Arc::new(Sensor);
        let entries = Sensor::handlers().into_entries();
        let normal = &entries[2];

        // Interleave inserts with view rebuilds from many threads; every
        // insert that completed must be visible to a later ordered_view.
        const THREADS: usize = 8;
        const INSERTS: usize = 200;
        std::thread::scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    for _ in 0..INSERTS {
                        let dispatcher = strategy
                            .create_dispatcher(&HandlerBinding::new(normal, &listener))
                            .unwrap();
                        registry.insert(Arc::new(Registration::new(
                            Arc::clone(&listener),
                            normal,
                            dispatcher,
                        )));
                        registry.ordered_view();
                    }
                });
            }
        });

        assert_eq!(registry.ordered_view().len(), THREADS * INSERTS);
    }

    #[test]
    fn test_contains_listener_by_identity() {
        let registry = Registry::new();
        let (listener, regs) = registrations();
        let id = listener_addr(&listener);

        assert!(!registry.contains_listener(id));
        registry.insert(Arc::clone(&regs[0]));
        assert!(registry.contains_listener(id));

        let other: Arc<dyn Any + Send + Sync> = Arc::new(Sensor);
        assert!(!registry.contains_listener(listener_addr(&other)));
    }
}
