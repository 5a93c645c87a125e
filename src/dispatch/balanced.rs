//! # Load-balanced dispatcher pool.
//!
//! Fans a stream of events out over several [`EventDispatcher`] queues. Each
//! published event goes to exactly one queue, picked by the configured
//! [`LoadBalanceStrategy`]; completion and cancellation fan out to all of
//! them.

use std::sync::Arc;

use crate::events::Event;
use crate::registry::Registry;
use crate::routing::{DispatchErrorHandler, Router};

use super::balance::{LoadBalance, LoadBalanceStrategy};
use super::dispatcher::{Dispatch, EventDispatcher};

/// Pool of single-queue dispatchers behind one `Dispatch` front.
pub struct LoadBalancedDispatcher {
    dispatchers: Vec<Arc<EventDispatcher>>,
    balance: LoadBalance,
}

impl LoadBalancedDispatcher {
    /// Spawns `workers` queues (clamped to at least 1) over a shared
    /// registry and router.
    pub fn new(
        registry: Registry,
        router: Arc<dyn Router>,
        workers: usize,
        capacity: usize,
        strategy: LoadBalanceStrategy,
        on_error: Option<DispatchErrorHandler>,
    ) -> Self {
        let workers = workers.max(1);
        let dispatchers = (0..workers)
            .map(|_| {
                Arc::new(EventDispatcher::new(
                    registry.clone(),
                    Arc::clone(&router),
                    capacity,
                    on_error.clone(),
                ))
            })
            .collect();
        Self {
            dispatchers,
            balance: LoadBalance::new(strategy),
        }
    }

    /// Number of worker queues.
    pub fn workers(&self) -> usize {
        self.dispatchers.len()
    }

    /// Waits for every worker loop to stop.
    pub async fn join(&self) {
        for dispatcher in &self.dispatchers {
            dispatcher.join().await;
        }
    }
}

impl Dispatch for LoadBalancedDispatcher {
    fn on_next(&self, event: Event) {
        // Key-less events still go to a queue; the worker logs and skips them.
        let idx = match event.key() {
            Some(key) => self.balance.pick(self.dispatchers.len(), key),
            None => Some(0),
        };
        if let Some(idx) = idx {
            self.dispatchers[idx].on_next(event);
        }
    }

    fn on_complete(&self) {
        for dispatcher in &self.dispatchers {
            dispatcher.on_complete();
        }
    }

    fn on_cancel(&self) {
        for dispatcher in &self.dispatchers {
            dispatcher.on_cancel();
        }
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
    use tokio::time::timeout;

    fn keyed(key: &str) -> Event {
        let mut ev = Event::unit();
        ev.set_key(Key::from(key));
        ev
    }

    #[tokio::test]
    async fn test_every_event_lands_exactly_once() {
        let registry = Registry::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
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

        let router: Arc<dyn Router> =
            Arc::new(FilteringRouter::new(Arc::new(PassThroughFilter)));
        let pool = LoadBalancedDispatcher::new(
            registry,
            router,
            3,
            16,
            LoadBalanceStrategy::RoundRobin,
            None,
        );
        assert_eq!(pool.workers(), 3);

        let mut sent = Vec::new();
        for _ in 0..9 {
            let ev = keyed("orders");
            sent.push(ev.id());
            pool.on_next(ev);
        }

        let mut got = Vec::new();
        for _ in 0..9 {
            let id = timeout(Duration::from_secs(1), rx.recv())
                .await
                .expect("delivery timed out")
                .expect("channel closed");
            got.push(id);
        }
        got.sort_unstable();
        sent.sort_unstable();
        assert_eq!(got, sent);

        pool.on_complete();
        pool.join().await;
    }

    #[tokio::test]
    async fn test_zero_workers_clamps_to_one() {
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

        let router: Arc<dyn Router> =
            Arc::new(FilteringRouter::new(Arc::new(PassThroughFilter)));
        let pool = LoadBalancedDispatcher::new(
            registry,
            router,
            0,
            16,
            LoadBalanceStrategy::None,
            None,
        );
        assert_eq!(pool.workers(), 1);

        pool.on_next(keyed("orders"));
        pool.on_complete();
        pool.join().await;
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }
}
