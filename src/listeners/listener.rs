//! # Listener trait.
//!
//! A listener is any type hosting zero or more handler functions. Instead of
//! scanning for annotated methods at runtime, a listener declares its
//! handlers once, in a [`HandlerTable`] returned from [`Listener::handlers`].
//! The table is built per listener *type*; `subscribe` binds it to a
//! concrete *instance*.
//!
//! Because `handlers()` is written inside the listener's own module, it can
//! name private functions. Declare those entries with
//! [`Visibility::Private`](crate::Visibility::Private) so strategies that
//! cannot invoke private handlers reject them at `subscribe` instead of
//! silently skipping them.
//!
//! ## Example
//! ```rust
//! use eventbus::{Event, HandlerResult, HandlerTable, Listener, Priority};
//!
//! struct Tick {
//!     count: u32,
//! }
//! impl Event for Tick {}
//!
//! struct Clock;
//!
//! impl Clock {
//!     fn on_tick(&self, tick: &mut Tick) -> HandlerResult {
//!         tick.count += 1;
//!         Ok(())
//!     }
//! }
//!
//! impl Listener for Clock {
//!     fn handlers() -> HandlerTable<Self> {
//!         HandlerTable::new().handler_at("on_tick", Priority::High, Self::on_tick)
//!     }
//! }
//! ```

use std::any::Any;

use super::HandlerTable;

/// A type hosting handler functions that can be subscribed to an
/// [`EventBus`](crate::EventBus).
pub trait Listener: Any + Send + Sync {
    /// Declares the handler table for this listener type.
    ///
    /// Called by `subscribe` and `unsubscribe`; must be deterministic for a
    /// given type. Entries appear in dispatch tie-break order: handlers with
    /// equal priority fire in the order they were declared and subscribed.
    fn handlers() -> HandlerTable<Self>
    where
        Self: Sized;
}
