//! # Bus façade: the public entry point.
//!
//! - [`EventBus`] — publish, subscribe, request/reply
//! - [`EventBusBuilder`] — registry, filter, dispatcher pool configuration

mod builder;
#[allow(clippy::module_inception)]
mod bus;

pub use builder::EventBusBuilder;
pub use bus::EventBus;
