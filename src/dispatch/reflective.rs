//! # Reflective strategy.
//!
//! Performs no work at registration: the dispatcher re-resolves the listener
//! and the event through runtime type inspection on every call. Highest
//! per-call overhead, simplest construction. Whether it may invoke `Private`
//! handlers is chosen at construction.
//!
//! There is no wrapper layer around the handler's failure: the error a
//! handler returns is exactly what the `fire` caller receives.

use crate::error::BusError;

use super::strategy::{DispatchStrategy, Dispatcher, HandlerBinding};

/// Strategy resolving types on every dispatch call.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReflectiveDispatch {
    allow_private: bool,
}

impl ReflectiveDispatch {
    /// Creates the strategy; `allow_private` opts in to invoking handlers
    /// declared [`Visibility::Private`](crate::Visibility::Private).
    #[must_use]
    pub fn new(allow_private: bool) -> Self {
        Self { allow_private }
    }
}

impl DispatchStrategy for ReflectiveDispatch {
    fn name(&self) -> &'static str {
        "reflective"
    }

    fn can_invoke_private(&self) -> bool {
        self.allow_private
    }

    fn create_dispatcher(&self, binding: &HandlerBinding<'_>) -> Result<Dispatcher, BusError> {
        Ok(binding.checked())
    }
}
