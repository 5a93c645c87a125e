//! # Filtering router.
//!
//! The delivery pipeline for one published event:
//!
//! ```text
//! matched ──► filter ──► drop cancelled ──► sort by priority ──► deliver each
//! ```
//!
//! ## Rules
//! - Priority ordering is stable: higher priority first, ties keep
//!   registration order.
//! - Each delivery is isolated: an `Err` or a panic is reported through the
//!   error handler (or logged) and the next consumer still runs.
//! - `cancel_after_use` registrations are cancelled after their delivery
//!   attempt, whether it succeeded or not.

use std::cmp::Reverse;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::error;

use crate::error::HandlerError;
use crate::events::{Event, Key};
use crate::filters::FilterRef;
use crate::registry::Registration;

use super::router::{DispatchErrorHandler, Router};

/// Router applying one filter strategy, then delivering in priority order.
pub struct FilteringRouter {
    filter: FilterRef,
    spawn_handlers: bool,
}

impl FilteringRouter {
    /// Creates a router that awaits each consumer inline, in order.
    pub fn new(filter: FilterRef) -> Self {
        Self {
            filter,
            spawn_handlers: false,
        }
    }

    /// Runs each consumer on its own task instead of awaiting inline.
    ///
    /// Trades per-event ordering across consumers for throughput when
    /// handlers block on I/O.
    pub fn spawn_handlers(mut self, spawn: bool) -> Self {
        self.spawn_handlers = spawn;
        self
    }
}

#[async_trait]
impl Router for FilteringRouter {
    async fn route(
        &self,
        key: &Key,
        event: Event,
        registrations: Vec<Registration>,
        on_error: Option<DispatchErrorHandler>,
    ) {
        let mut selected = self.filter.filter(registrations, key);
        selected.retain(|reg| !reg.is_cancelled());
        selected.sort_by_key(|reg| Reverse(reg.consumer().priority()));

        for reg in selected {
            let ev = event.clone();
            if self.spawn_handlers {
                let on_error = on_error.clone();
                tokio::spawn(async move {
                    deliver(reg, ev, on_error).await;
                });
            } else {
                deliver(reg, ev, on_error.clone()).await;
            }
        }
    }
}

/// Runs one consumer with panic isolation, then honors `cancel_after_use`.
async fn deliver(reg: Registration, event: Event, on_error: Option<DispatchErrorHandler>) {
    let consumer = reg.consumer();
    let name = consumer.name().to_owned();

    let outcome = AssertUnwindSafe(consumer.on_event(event)).catch_unwind().await;
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(err)) => report(&name, err, &on_error),
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            report(&name, format!("consumer panicked: {msg}").into(), &on_error);
        }
    }

    if reg.is_cancel_after_use() {
        reg.cancel();
    }
}

fn report(consumer: &str, err: HandlerError, on_error: &Option<DispatchErrorHandler>) {
    match on_error {
        Some(handler) => handler(err),
        None => error!(consumer, error = %err, "consumer failed"),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumers::FnConsumer;
    use crate::filters::PassThroughFilter;
    use crate::registry::Registry;
    use crate::selectors::Selector;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_delivers_in_priority_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let registry = Registry::new();
        for (name, prio) in [("low", 0), ("high", 10), ("mid", 5), ("mid-too", 5)] {
            let order = Arc::clone(&order);
            let consumer = FnConsumer::new(name, move |_ev: Event| {
                let order = Arc::clone(&order);
                async move {
                    order.lock().unwrap().push(name);
                    Ok(())
                }
            })
            .with_priority(prio);
            registry.register(Selector::value("k"), Arc::new(consumer));
        }

        let key = Key::from("k");
        let router = FilteringRouter::new(Arc::new(PassThroughFilter));
        router
            .route(&key, Event::unit(), registry.select(&key), None)
            .await;

        assert_eq!(*order.lock().unwrap(), ["high", "mid", "mid-too", "low"]);
    }

    #[tokio::test]
    async fn test_failure_is_isolated_and_reported() {
        let delivered = Arc::new(AtomicUsize::new(0));
        let failures = Arc::new(AtomicUsize::new(0));

        let registry = Registry::new();
        registry.register(
            Selector::value("k"),
            FnConsumer::arc("boom", |_ev: Event| async {
                Err::<(), HandlerError>("broken".into())
            }),
        );
        let d = Arc::clone(&delivered);
        registry.register(
            Selector::value("k"),
            FnConsumer::arc("ok", move |_ev: Event| {
                let d = Arc::clone(&d);
                async move {
                    d.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
        );

        let f = Arc::clone(&failures);
        let on_error: DispatchErrorHandler = Arc::new(move |_err| {
            f.fetch_add(1, Ordering::SeqCst);
        });

        let key = Key::from("k");
        let router = FilteringRouter::new(Arc::new(PassThroughFilter));
        router
            .route(&key, Event::unit(), registry.select(&key), Some(on_error))
            .await;

        assert_eq!(delivered.load(Ordering::SeqCst), 1);
        assert_eq!(failures.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panic_is_caught_and_reported() {
        let failures = Arc::new(Mutex::new(Vec::new()));
        let registry = Registry::new();
        registry.register(
            Selector::value("k"),
            FnConsumer::arc("panicky", |_ev: Event| async {
                if true {
                    panic!("kaboom");
                }
                Ok(())
            }),
        );

        let f = Arc::clone(&failures);
        let on_error: DispatchErrorHandler = Arc::new(move |err| {
            f.lock().unwrap().push(err.to_string());
        });

        let key = Key::from("k");
        let router = FilteringRouter::new(Arc::new(PassThroughFilter));
        router
            .route(&key, Event::unit(), registry.select(&key), Some(on_error))
            .await;

        let failures = failures.lock().unwrap();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("kaboom"));
    }

    #[tokio::test]
    async fn test_cancel_after_use_cancels_even_on_failure() {
        let registry = Registry::new();
        let reg = registry.register(
            Selector::value("k"),
            FnConsumer::arc("boom", |_ev: Event| async {
                Err::<(), HandlerError>("broken".into())
            }),
        );
        reg.cancel_after_use();

        let key = Key::from("k");
        let router = FilteringRouter::new(Arc::new(PassThroughFilter));
        let on_error: DispatchErrorHandler = Arc::new(|_err| {});
        router
            .route(&key, Event::unit(), registry.select(&key), Some(on_error))
            .await;

        assert!(reg.is_cancelled());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_skips_registrations_cancelled_after_match() {
        let delivered = Arc::new(AtomicUsize::new(0));
        let registry = Registry::new();
        let d = Arc::clone(&delivered);
        let reg = registry.register(
            Selector::value("k"),
            FnConsumer::arc("late-cancel", move |_ev: Event| {
                let d = Arc::clone(&d);
                async move {
                    d.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
        );

        let key = Key::from("k");
        let matched = registry.select(&key);
        reg.cancel();

        let router = FilteringRouter::new(Arc::new(PassThroughFilter));
        router.route(&key, Event::unit(), matched, None).await;
        assert_eq!(delivered.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_panic_message_downcasts() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("static str");
        assert_eq!(panic_message(boxed.as_ref()), "static str");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
