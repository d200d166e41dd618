//! Per-event-type registries and their registrations.

mod registration;
mod registry;

pub(crate) use registration::{Registration, listener_addr};
pub(crate) use registry::Registry;
