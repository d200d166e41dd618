//! # Handler priority and declared visibility.
//!
//! [`Priority`] orders handlers within one `fire` call: lower variants run
//! first, so a `Lowest` handler observes the event before a `Highest` one.
//! Handlers sharing a priority run in registration order.
//!
//! [`Visibility`] is declared metadata on a handler table entry. It models
//! where the handler function lives relative to its type: every dispatch
//! strategy invokes `Public` and `Module` handlers, while `Private` handlers
//! require a strategy with
//! [`can_invoke_private`](crate::DispatchStrategy::can_invoke_private).
//!
//! ## Example
//! ```
//! use eventbus::Priority;
//!
//! assert!(Priority::Lowest < Priority::Highest);
//! assert_eq!(Priority::default(), Priority::Normal);
//! ```

use std::fmt;

/// Dispatch priority of a handler.
///
/// Lower variants sort first and are invoked first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    /// Runs before every other priority level.
    Lowest,
    /// Runs after `Lowest`, before `Normal`.
    Low,
    /// The default priority.
    #[default]
    Normal,
    /// Runs after `Normal`, before `Highest`.
    High,
    /// Runs after every other priority level.
    Highest,
}

/// Declared visibility of a handler function.
///
/// Opaque metadata as far as the registry is concerned; only strategy
/// selection consults it, at `subscribe` time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Part of the listener type's public API.
    #[default]
    Public,
    /// Visible within the listener's module (`pub(crate)` and friends).
    Module,
    /// Private to the listener type; invokable only by strategies that
    /// declare `can_invoke_private`.
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Visibility::Public => "public",
            Visibility::Module => "module",
            Visibility::Private => "private",
        };
        f.write_str(s)
    }
}
