//! # Handle-based strategy.
//!
//! Binds the listener at registration time and keeps nothing else: no cache,
//! no shared artifact. The construction is the simplest of the pre-binding
//! strategies, and because it holds the bound listener directly it can
//! invoke `Private` handlers.

use crate::error::BusError;

use super::strategy::{DispatchStrategy, Dispatcher, HandlerBinding};

/// Strategy binding each registration individually at subscribe time.
///
/// Per-call cost: one event downcast. No construction artifact is shared
/// between registrations.
#[derive(Debug, Default, Clone, Copy)]
pub struct HandleDispatch;

impl HandleDispatch {
    /// Creates the strategy.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DispatchStrategy for HandleDispatch {
    fn name(&self) -> &'static str {
        "handle"
    }

    fn can_invoke_private(&self) -> bool {
        true
    }

    fn create_dispatcher(&self, binding: &HandlerBinding<'_>) -> Result<Dispatcher, BusError> {
        binding.bind(self.name())
    }
}
