//! # eventbus
//!
//! **eventbus** is an in-process publish-subscribe event dispatcher.
//!
//! Listener types declare handler functions bound to specific event types
//! and priorities; publishers fire event instances and the bus invokes every
//! matching handler synchronously, in priority order, propagating the first
//! failure back to the caller.
//!
//! ## Architecture
//! ```text
//!  ┌────────────┐  subscribe   ┌───────────────────────────────────────┐
//!  │  Listener  │ ───────────► │ EventBus                              │
//!  │ (handler   │              │  - DispatchStrategy (pluggable)       │
//!  │  table)    │              │  - Registry per concrete event type   │
//!  └────────────┘              │  - ad-hoc closures per event type     │
//!                              └──────┬────────────────────────────────┘
//!  ┌────────────┐    fire             │
//!  │ Publisher  │ ───────────►  Registry[TypeId::of::<E>()]
//!  └────────────┘                     │ ordered_view()  (priority-sorted,
//!                                     ▼                  invalidation-cached)
//!                            Registration dispatchers, ascending priority
//!                                     │ then
//!                                     ▼
//!                            ad-hoc closures, insertion order
//! ```
//!
//! ## Features
//! | Area            | Description                                                   | Key types / traits                       |
//! |-----------------|---------------------------------------------------------------|------------------------------------------|
//! | **Listeners**   | Declare handlers per type in an explicit table.               | [`Listener`], [`HandlerTable`]           |
//! | **Events**      | Any `'static` type, routed by exact concrete type.            | [`Event`]                                |
//! | **Priorities**  | Five ordered levels; ties resolve by registration order.      | [`Priority`]                             |
//! | **Strategies**  | Swap how registrations become callables.                      | [`DispatchStrategy`], [`DirectDispatch`] |
//! | **Ad-hoc**      | Closure subscriptions without a listener type.                | [`EventBus::on`], [`EventBus::on_async`] |
//! | **Errors**      | Typed, attributed failures; originals preserved.              | [`BusError`], [`HandlerResult`]          |
//!
//! ## Guarantees
//! - Within one `fire` call, registry handlers run in ascending priority
//!   order (ties: registration order), then ad-hoc closures run in insertion
//!   order. Fail-fast on the first failure.
//! - `subscribe` / `unsubscribe` / `fire` may be called concurrently from
//!   any thread; a fire that begins after a subscribe returns observes it.
//! - Dispatch is by the event's exact concrete type; no supertype matching.
//! - No persistence, no queuing, no cross-process delivery.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventbus::{Event, EventBus, HandlerResult, HandlerTable, Listener, Priority};
//!
//! struct Damage {
//!     amount: u32,
//!     cancelled: bool,
//! }
//! impl Event for Damage {}
//!
//! struct Armor;
//! impl Armor {
//!     fn absorb(&self, event: &mut Damage) -> HandlerResult {
//!         event.amount = event.amount.saturating_sub(5);
//!         Ok(())
//!     }
//!
//!     fn cancel_if_spent(&self, event: &mut Damage) -> HandlerResult {
//!         if event.amount == 0 {
//!             event.cancelled = true;
//!         }
//!         Ok(())
//!     }
//! }
//! impl Listener for Armor {
//!     fn handlers() -> HandlerTable<Self> {
//!         HandlerTable::new()
//!             .handler_at("absorb", Priority::Low, Self::absorb)
//!             .handler_at("cancel_if_spent", Priority::Highest, Self::cancel_if_spent)
//!     }
//! }
//!
//! fn main() -> Result<(), eventbus::BusError> {
//!     let bus = EventBus::new();
//!     let armor = Arc::new(Armor);
//!     bus.subscribe(&armor)?;
//!
//!     let hit = bus.fire(Damage { amount: 3, cancelled: false })?;
//!     assert!(hit.cancelled);
//!     Ok(())
//! }
//! ```

mod bus;
mod dispatch;
mod error;
mod events;
mod listeners;
mod registry;

// ---- Public re-exports ----

pub use bus::EventBus;
pub use dispatch::{
    DirectDispatch, DispatchStrategy, Dispatcher, HandleDispatch, HandlerBinding,
    ReflectiveDispatch,
};
pub use error::{BusError, HandlerError, HandlerResult};
pub use events::Event;
pub use listeners::{HandlerFn, HandlerTable, Listener, Priority, Visibility};
