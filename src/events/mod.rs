//! Event marker trait.

mod event;

pub use event::Event;
