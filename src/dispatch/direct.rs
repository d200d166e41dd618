//! # Direct-call strategy (recommended default).
//!
//! The Rust stand-in for a runtime-codegen backend: handler tables already
//! capture a monomorphized entry point per handler while the concrete
//! listener and event types are statically known, so "generating" a
//! specialized callable amounts to reusing that artifact. [`DirectDispatch`]
//! caches it per handler identity, so many instances of the same listener
//! type share one artifact instead of re-deriving it on every `subscribe`.
//!
//! ## Rules
//! - The cache is scoped to the strategy instance (and therefore to the bus
//!   that owns it): no process-global state, no cross-bus leakage.
//! - The cache is append-only; concurrent populations race benignly and the
//!   first writer for a key wins. Building the artifact redundantly is safe.
//! - Cannot invoke `Private` handlers.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::BusError;
use crate::listeners::{Binder, HandlerId};

use super::strategy::{DispatchStrategy, Dispatcher, HandlerBinding};

/// Strategy binding handlers through a per-handler cached artifact.
///
/// Per-call cost: one event downcast. Construction cost: a cache lookup plus,
/// on first sight of a handler, storing its binder artifact.
pub struct DirectDispatch {
    cache: RwLock<HashMap<HandlerId, Arc<Binder>>>,
}

impl DirectDispatch {
    /// Creates a strategy with an empty dispatcher cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn cached_binder(&self, binding: &HandlerBinding<'_>) -> Arc<Binder> {
        let id = binding.handler_id();

        let hit = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned();
        if let Some(binder) = hit {
            return binder;
        }

        // Built outside the write lock; a concurrent builder may get there
        // first, in which case this copy is discarded.
        let built = binding.binder();
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cache.entry(id).or_insert(built))
    }
}

impl Default for DirectDispatch {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchStrategy for DirectDispatch {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn can_invoke_private(&self) -> bool {
        false
    }

    fn create_dispatcher(&self, binding: &HandlerBinding<'_>) -> Result<Dispatcher, BusError> {
        let binder = self.cached_binder(binding);
        (binder)(binding.listener()).map_err(|e| BusError::Dispatcher {
            handler: binding.handler_name(),
            strategy: self.name(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::HandlerResult;
    use crate::events::Event;
    use crate::listeners::{HandlerTable, Listener, ListenerRef};

    use super::*;

    struct Tick;
    impl Event for Tick {}

    struct Beep;
    impl Event for Beep {}

    #[derive(Default)]
    struct Counter {
        ticks: AtomicUsize,
    }

    impl Counter {
        fn on_tick(&self, _event: &mut Tick) -> HandlerResult {
            self.ticks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn on_beep(&self, _event: &mut Beep) -> HandlerResult {
            Ok(())
        }
    }

    impl Listener for Counter {
        fn handlers() -> HandlerTable<Self> {
            HandlerTable::new()
                .handler("on_tick", Self::on_tick)
                .handler("on_beep", Self::on_beep)
        }
    }

    #[test]
    fn test_cache_shared_across_listener_instances() {
        let strategy = DirectDispatch::new();
        let entries = Counter::handlers().into_entries();

        let first: ListenerRef = Arc::new(Counter::default());
        let second: ListenerRef = Arc::new(Counter::default());

        strategy
            .create_dispatcher(&HandlerBinding::new(&entries[0], &first))
            .unwrap();
        strategy
            .create_dispatcher(&HandlerBinding::new(&entries[0], &second))
            .unwrap();
        assert_eq!(strategy.cache.read().unwrap().len(), 1);

        strategy
            .create_dispatcher(&HandlerBinding::new(&entries[1], &first))
            .unwrap();
        assert_eq!(strategy.cache.read().unwrap().len(), 2);
    }

    #[test]
    fn test_dispatcher_invokes_bound_listener() {
        let strategy = DirectDispatch::new();
        let entries = Counter::handlers().into_entries();

        let counter = Arc::new(Counter::default());
        let erased: ListenerRef = Arc::clone(&counter) as ListenerRef;

        let dispatcher = strategy
            .create_dispatcher(&HandlerBinding::new(&entries[0], &erased))
            .unwrap();

        let mut tick = Tick;
        dispatcher(&mut tick).unwrap();
        dispatcher(&mut tick).unwrap();
        assert_eq!(counter.ticks.load(Ordering::SeqCst), 2);
    }
}
