//! Error types used by the event bus.
//!
//! This module defines:
//!
//! - [`HandlerError`] / [`HandlerResult`] — the single error channel for
//!   handler and closure failures. Handlers return whatever error they like,
//!   boxed; the bus never wraps it in anything that has to be unwrapped.
//! - [`BusError`] — failures surfaced by [`subscribe`](crate::EventBus::subscribe)
//!   and [`fire`](crate::EventBus::fire), attributing the failure to a handler,
//!   an ad-hoc closure, or dispatcher construction.
//!
//! [`BusError`] provides [`as_label`](BusError::as_label) for logging/metrics
//! and [`handler_error`](BusError::handler_error) to reach the original failure.

use std::error::Error;

use thiserror::Error;

use crate::listeners::Visibility;

/// Boxed error produced by a handler or an ad-hoc closure.
///
/// The bus propagates this value unchanged: the caller of `fire` can
/// `downcast_ref` it back to the concrete error the handler returned.
pub type HandlerError = Box<dyn Error + Send + Sync + 'static>;

/// Result type returned by handlers and ad-hoc closures.
pub type HandlerResult = Result<(), HandlerError>;

/// # Errors produced by the event bus.
///
/// Dispatch failures (`Handler`, `Closure`) carry the original [`HandlerError`]
/// in their `source` field; the remaining variants are usage errors raised
/// synchronously by `subscribe`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BusError {
    /// A registered handler failed during `fire`.
    ///
    /// Fail-fast: handlers ordered after the failing one were not invoked.
    #[error("handler '{handler}' failed while dispatching '{event}': {source}")]
    Handler {
        /// Name of the failing handler, as declared in the handler table.
        handler: &'static str,
        /// Type name of the event being dispatched.
        event: &'static str,
        /// The original failure, exactly as the handler returned it.
        #[source]
        source: HandlerError,
    },

    /// An ad-hoc closure registered via `on`/`on_async` failed during `fire`.
    #[error("ad-hoc closure failed while dispatching '{event}': {source}")]
    Closure {
        /// Type name of the event being dispatched.
        event: &'static str,
        /// The original failure, exactly as the closure returned it.
        #[source]
        source: HandlerError,
    },

    /// A handler's declared visibility is not invokable by the active strategy.
    ///
    /// Raised by `subscribe` before any handler of the listener is registered;
    /// a listener is registered in full or not at all.
    #[error("handler '{handler}' has {declared} visibility, which the '{strategy}' strategy cannot invoke")]
    DisallowedVisibility {
        /// Name of the offending handler.
        handler: &'static str,
        /// Visibility declared in the handler table.
        declared: Visibility,
        /// Name of the active dispatch strategy.
        strategy: &'static str,
    },

    /// The active strategy failed to construct a dispatcher for a handler.
    ///
    /// Surfaces at `subscribe` time, never deferred to `fire`.
    #[error("the '{strategy}' strategy could not build a dispatcher for handler '{handler}': {reason}")]
    Dispatcher {
        /// Name of the handler the dispatcher was built for.
        handler: &'static str,
        /// Name of the active dispatch strategy.
        strategy: &'static str,
        /// Construction failure description.
        reason: String,
    },
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventbus::BusError;
    ///
    /// let err = BusError::Closure {
    ///     event: "Tick",
    ///     source: "boom".into(),
    /// };
    /// assert_eq!(err.as_label(), "closure_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::Handler { .. } => "handler_failed",
            BusError::Closure { .. } => "closure_failed",
            BusError::DisallowedVisibility { .. } => "disallowed_visibility",
            BusError::Dispatcher { .. } => "dispatcher_construction",
        }
    }

    /// Returns the original handler/closure failure, if this is a dispatch error.
    ///
    /// The returned error is the exact value the handler produced and can be
    /// downcast to its concrete type.
    pub fn handler_error(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        match self {
            BusError::Handler { source, .. } | BusError::Closure { source, .. } => {
                Some(source.as_ref())
            }
            _ => None,
        }
    }
}
