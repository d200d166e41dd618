//! # Event marker trait.
//!
//! Any `'static` type can act as an event by implementing [`Event`]; the
//! trait is the opt-in that admits a type to the bus boundary. Dispatch is
//! by **exact concrete type**: firing a `Tick` reaches only handlers and
//! closures declared for `Tick`, never for some supertype of it.
//!
//! Handlers receive events by `&mut`, so an event can carry data in both
//! directions: publishers read whatever handlers wrote after `fire` returns
//! the instance back.
//!
//! ## Example
//! ```rust
//! use eventbus::Event;
//!
//! struct ChatMessage {
//!     text: String,
//!     cancelled: bool,
//! }
//!
//! impl Event for ChatMessage {}
//! ```

use std::any::Any;

/// Marker trait for types that can be fired through an [`EventBus`](crate::EventBus).
///
/// `Any` gives the bus the concrete runtime type to route by; `Send + Sync`
/// lets events cross the suspending `fire` variant and dispatchers shared
/// between threads.
pub trait Event: Any + Send + Sync {}
