//! # Bus configuration.
//!
//! [`BusConfig`] defines the dispatch topology: worker queue count, queue
//! capacity, load-balance strategy, and handler execution mode.
//!
//! # Example
//! ```
//! use keybus::{BusConfig, LoadBalanceStrategy};
//!
//! let mut cfg = BusConfig::default();
//! cfg.workers = 4;
//! cfg.queue_capacity = 256;
//! cfg.strategy = LoadBalanceStrategy::RoundRobin;
//!
//! assert_eq!(cfg.workers, 4);
//! ```

use crate::dispatch::LoadBalanceStrategy;

/// Configuration for an [`EventBus`](crate::EventBus).
///
/// Controls the dispatcher pool size, per-queue capacity, queue selection
/// strategy, and whether consumers run inline or on spawned tasks.
#[derive(Clone, Debug)]
pub struct BusConfig {
    /// Number of dispatch queues (0 = one per available core).
    pub workers: usize,
    /// Capacity of each dispatch queue (clamped to at least 1).
    pub queue_capacity: usize,
    /// How a queue is picked for each published event.
    pub strategy: LoadBalanceStrategy,
    /// Run each matched consumer on its own task instead of awaiting inline.
    pub spawn_handlers: bool,
}

impl BusConfig {
    /// Resolves `workers`, mapping the 0 sentinel to the core count.
    pub(crate) fn resolved_workers(&self) -> usize {
        if self.workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.workers
        }
    }
}

impl Default for BusConfig {
    /// Provides a default configuration:
    /// - `workers = 1`
    /// - `queue_capacity = 1024`
    /// - `strategy = LoadBalanceStrategy::Random`
    /// - `spawn_handlers = false`
    fn default() -> Self {
        Self {
            workers: 1,
            queue_capacity: 1024,
            strategy: LoadBalanceStrategy::default(),
            spawn_handlers: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_workers_resolves_to_core_count() {
        let mut cfg = BusConfig::default();
        cfg.workers = 0;
        assert!(cfg.resolved_workers() >= 1);
        cfg.workers = 3;
        assert_eq!(cfg.resolved_workers(), 3);
    }
}
