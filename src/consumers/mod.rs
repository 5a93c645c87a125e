//! # Consumers: the receiving side of the bus.
//!
//! - [`Consume`] — trait every event handler implements
//! - [`FnConsumer`] — closure-backed implementation for the common case
//! - [`ConsumerRef`] — shared handle (`Arc<dyn Consume>`)
//!
//! Consumers are registered against a selector via
//! [`EventBus::on`](crate::EventBus::on) or directly on a
//! [`Registry`](crate::registry::Registry).

mod consume;
mod fn_consumer;

pub(crate) use consume::innermost;
pub use consume::{Consume, ConsumerRef};
pub use fn_consumer::FnConsumer;
