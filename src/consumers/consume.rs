//! # Core consumer trait.
//!
//! [`Consume`] is the extension point for event handlers. Implementations
//! run on a dispatcher loop (or a spawned task, if the router is configured
//! to hand off) and must not assume any cross-consumer ordering.
//!
//! ## Contract
//! - Returning `Err` reports a delivery failure; the router passes it to the
//!   dispatch error handler or logs it. It never reaches the producer and
//!   never affects sibling consumers.
//! - Panics are caught by the router and treated like errors.
//! - [`Consume::priority`] orders delivery when several consumers match the
//!   same key: higher first, ties keep registration order.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::HandlerError;
use crate::events::Event;

/// Shared handle to a consumer.
pub type ConsumerRef = Arc<dyn Consume>;

/// Contract for event consumers.
#[async_trait]
pub trait Consume: Send + Sync + 'static {
    /// Handles a single event.
    async fn on_event(&self, event: Event) -> Result<(), HandlerError>;

    /// Delivery priority; higher runs first when several consumers match.
    fn priority(&self) -> i32 {
        0
    }

    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// The consumer this one wraps, if it is a decorating proxy.
    ///
    /// De-duplication resolves identity through this, so a consumer
    /// registered several times behind different proxies still counts as one.
    fn underlying(&self) -> Option<&ConsumerRef> {
        None
    }
}

/// Resolves a consumer handle to its innermost non-proxy consumer.
pub(crate) fn innermost(consumer: &ConsumerRef) -> &ConsumerRef {
    let mut current = consumer;
    while let Some(inner) = current.underlying() {
        current = inner;
    }
    current
}
