//! # Function-backed consumer (`FnConsumer`).
//!
//! [`FnConsumer`] wraps a closure `F: Fn(Event) -> Fut`, producing a fresh
//! future per delivery. Shared state, if any, goes through an explicit
//! `Arc` inside the closure.
//!
//! ## Example
//! ```rust
//! use keybus::{ConsumerRef, Event, FnConsumer};
//!
//! let c: ConsumerRef = FnConsumer::arc("audit", |ev: Event| async move {
//!     println!("event {}", ev.id());
//!     Ok(())
//! });
//! assert_eq!(c.name(), "audit");
//! assert_eq!(c.priority(), 0);
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::events::Event;

use super::consume::Consume;

/// Function-backed consumer implementation.
#[derive(Debug)]
pub struct FnConsumer<F> {
    name: Cow<'static, str>,
    priority: i32,
    f: F,
}

impl<F> FnConsumer<F> {
    /// Creates a new function-backed consumer with priority 0.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            priority: 0,
            f,
        }
    }

    /// Sets the delivery priority (higher runs first).
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Creates the consumer and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Consume for FnConsumer<F>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn on_event(&self, event: Event) -> Result<(), HandlerError> {
        (self.f)(event).await
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_invokes_closure() {
        let hits = Arc::new(AtomicU32::new(0));
        let h = Arc::clone(&hits);
        let c = FnConsumer::arc("counter", move |_ev: Event| {
            let h = Arc::clone(&h);
            async move {
                h.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        c.on_event(Event::unit()).await.unwrap();
        c.on_event(Event::unit()).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_priority_and_name() {
        let c = FnConsumer::new("prio", |_ev: Event| async { Ok(()) }).with_priority(5);
        assert_eq!(c.priority(), 5);
        assert_eq!(c.name(), "prio");
    }
}
