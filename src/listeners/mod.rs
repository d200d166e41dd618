//! Listener trait, handler tables, and handler metadata.

mod listener;
mod priority;
mod table;

pub use listener::Listener;
pub use priority::{Priority, Visibility};
pub use table::{HandlerFn, HandlerTable};

pub(crate) use table::{Binder, Handler, HandlerId, ListenerRef, TypeMismatch};
