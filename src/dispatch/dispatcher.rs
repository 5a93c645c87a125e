//! # Single-queue event dispatcher.
//!
//! ```text
//! on_next(event) ──try_send──► [ bounded queue ] ──► worker loop
//!                                                      │ registry.select(key)
//!                                                      ▼
//!                                                    router.route(..)
//! ```
//!
//! ## Rules
//! - Producers never block: when the queue is full the event is dropped and
//!   a warning is logged.
//! - `on_complete` drains what is already queued, then stops the worker.
//! - `on_cancel` stops the worker without draining.
//! - Events published without a key are logged and skipped.

use std::sync::{Arc, Mutex};

use tokio::select;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use tracing::{error, warn};

use crate::events::Event;
use crate::registry::Registry;
use crate::routing::{DispatchErrorHandler, Router};

/// Producer-facing dispatch contract.
pub trait Dispatch: Send + Sync + 'static {
    /// Enqueues one event. Never blocks; may drop on overflow.
    fn on_next(&self, event: Event);

    /// Stops accepting events, drains the queue, then stops.
    fn on_complete(&self);

    /// Stops immediately, discarding queued events.
    fn on_cancel(&self);
}

enum Frame {
    Next(Event),
    Complete,
}

/// Dispatcher backed by one bounded queue and one worker task.
pub struct EventDispatcher {
    tx: mpsc::Sender<Frame>,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl EventDispatcher {
    /// Spawns the worker loop. `capacity` is clamped to at least 1.
    pub fn new(
        registry: Registry,
        router: Arc<dyn Router>,
        capacity: usize,
        on_error: Option<DispatchErrorHandler>,
    ) -> Self {
        let (tx, mut rx) = mpsc::channel::<Frame>(capacity.max(1));
        let cancel = CancellationToken::new();

        let worker_cancel = cancel.clone();
        let worker = tokio::spawn(async move {
            loop {
                select! {
                    _ = worker_cancel.cancelled() => break,
                    frame = rx.recv() => match frame {
                        Some(Frame::Next(event)) => {
                            let Some(key) = event.key().cloned() else {
                                error!(event = event.id(), "event has no key, skipping");
                                continue;
                            };
                            let matched = registry.select(&key);
                            if matched.is_empty() {
                                continue;
                            }
                            router.route(&key, event, matched, on_error.clone()).await;
                        }
                        Some(Frame::Complete) | None => break,
                    },
                }
            }
        });

        Self {
            tx,
            cancel,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Waits for the worker loop to stop.
    ///
    /// Call after `on_complete` or `on_cancel`.
    pub async fn join(&self) {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

impl Dispatch for EventDispatcher {
    fn on_next(&self, event: Event) {
        match self.tx.try_send(Frame::Next(event)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("dispatch queue full, dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("dispatcher stopped, dropping event");
            }
        }
    }

    fn on_complete(&self) {
        if let Err(mpsc::error::TrySendError::Full(frame)) = self.tx.try_send(Frame::Complete) {
            // Queue is full of pending events; queue the completion behind them.
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let _ = tx.send(frame).await;
            });
        }
    }

    fn on_cancel(&self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumers::FnConsumer;
    use crate::events::Key;
    use crate::filters::PassThroughFilter;
    use crate::routing::FilteringRouter;
    use crate::selectors::Selector;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::{mpsc as tokio_mpsc, Notify};
    use tokio::time::timeout;

    fn router() -> Arc<dyn Router> {
        Arc::new(FilteringRouter::new(Arc::new(PassThroughFilter)))
    }

    fn keyed(key: &str) -> Event {
        let mut ev = Event::unit();
        ev.set_key(Key::from(key));
        ev
    }

    #[tokio::test]
    async fn test_delivers_published_events() {
        let registry = Registry::new();
        let (tx, mut rx) = tokio_mpsc::unbounded_channel();
        registry.register(
            Selector::value("orders"),
            FnConsumer::arc("probe", move |ev: Event| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(ev.id());
                    Ok(())
                }
            }),
        );

        let dispatcher = EventDispatcher::new(registry, router(), 16, None);
        dispatcher.on_next(keyed("orders"));
        dispatcher.on_next(keyed("orders"));

        for _ in 0..2 {
            timeout(Duration::from_secs(1), rx.recv())
                .await
                .expect("delivery timed out")
                .expect("channel closed");
        }

        dispatcher.on_complete();
        dispatcher.join().await;
    }

    #[tokio::test]
    async fn test_event_without_key_is_skipped() {
        let registry = Registry::new();
        let delivered = Arc::new(AtomicUsize::new(0));
        let d = Arc::clone(&delivered);
        registry.register(
            Selector::match_all(),
            FnConsumer::arc("probe", move |_ev: Event| {
                let d = Arc::clone(&d);
                async move {
                    d.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
        );

        let dispatcher = EventDispatcher::new(registry, router(), 16, None);
        dispatcher.on_next(Event::unit());
        dispatcher.on_next(keyed("orders"));

        dispatcher.on_complete();
        dispatcher.join().await;
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_overflow_drops_instead_of_blocking() {
        let registry = Registry::new();
        let gate = Arc::new(Notify::new());
        let (started_tx, mut started_rx) = tokio_mpsc::unbounded_channel();
        let delivered = Arc::new(AtomicUsize::new(0));

        let g = Arc::clone(&gate);
        let d = Arc::clone(&delivered);
        registry.register(
            Selector::value("orders"),
            FnConsumer::arc("slow", move |_ev: Event| {
                let g = Arc::clone(&g);
                let d = Arc::clone(&d);
                let started_tx = started_tx.clone();
                async move {
                    let _ = started_tx.send(());
                    g.notified().await;
                    d.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
        );

        let dispatcher = EventDispatcher::new(registry, router(), 1, None);
        dispatcher.on_next(keyed("orders"));
        timeout(Duration::from_secs(1), started_rx.recv())
            .await
            .expect("worker never started")
            .expect("channel closed");

        // Worker is blocked; one more event fits the queue, the rest drop.
        dispatcher.on_next(keyed("orders"));
        dispatcher.on_next(keyed("orders"));
        dispatcher.on_next(keyed("orders"));

        gate.notify_one();
        timeout(Duration::from_secs(1), started_rx.recv())
            .await
            .expect("second delivery never started")
            .expect("channel closed");
        gate.notify_one();

        dispatcher.on_complete();
        dispatcher.join().await;
        assert_eq!(delivered.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancel_stops_without_draining() {
        let registry = Registry::new();
        let delivered = Arc::new(AtomicUsize::new(0));
        let d = Arc::clone(&delivered);
        registry.register(
            Selector::value("orders"),
            FnConsumer::arc("probe", move |_ev: Event| {
                let d = Arc::clone(&d);
                async move {
                    d.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
        );

        let dispatcher = EventDispatcher::new(registry, router(), 16, None);
        dispatcher.on_cancel();
        dispatcher.join().await;

        dispatcher.on_next(keyed("orders"));
        assert_eq!(delivered.load(Ordering::SeqCst), 0);
    }
}
