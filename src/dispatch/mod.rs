//! Dispatch strategies: pluggable invocation backends.

mod direct;
mod handle;
mod reflective;
mod strategy;

pub use direct::DirectDispatch;
pub use handle::HandleDispatch;
pub use reflective::ReflectiveDispatch;
pub use strategy::{DispatchStrategy, Dispatcher, HandlerBinding};
