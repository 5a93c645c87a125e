//! # Load-balance primitives.
//!
//! [`RoundRobinCounters`] keeps one monotonic counter per key; the common
//! path takes the read lock only, escalating to the write lock the first
//! time a key is seen. [`LoadBalance`] turns a configured
//! [`LoadBalanceStrategy`] into an index picker over a slice of candidates.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use rand::Rng;

use crate::events::Key;

/// How a set of candidates (queues, consumers) is narrowed to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadBalanceStrategy {
    /// Uniform random pick.
    #[default]
    Random,
    /// Per-key rotation through the candidates.
    RoundRobin,
    /// Always the first candidate.
    None,
}

/// Per-key monotonic counters for round-robin rotation.
#[derive(Debug, Default)]
pub struct RoundRobinCounters {
    counters: RwLock<HashMap<Key, AtomicU64>>,
}

impl RoundRobinCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next tick for `key`, starting from 0.
    pub fn next(&self, key: &Key) -> u64 {
        {
            let counters = self
                .counters
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(counter) = counters.get(key) {
                return counter.fetch_add(1, Ordering::Relaxed);
            }
        }
        let mut counters = self
            .counters
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        counters
            .entry(key.clone())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed)
    }
}

/// Index picker backed by a strategy.
#[derive(Debug)]
pub(crate) struct LoadBalance {
    strategy: LoadBalanceStrategy,
    counters: RoundRobinCounters,
}

impl LoadBalance {
    pub(crate) fn new(strategy: LoadBalanceStrategy) -> Self {
        Self {
            strategy,
            counters: RoundRobinCounters::new(),
        }
    }

    /// Picks an index in `0..len`, or `None` when there are no candidates.
    pub(crate) fn pick(&self, len: usize, key: &Key) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let idx = match self.strategy {
            LoadBalanceStrategy::Random => rand::thread_rng().gen_range(0..len),
            LoadBalanceStrategy::RoundRobin => (self.counters.next(key) % len as u64) as usize,
            LoadBalanceStrategy::None => 0,
        };
        Some(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_robin_counters_rotate_per_key() {
        let counters = RoundRobinCounters::new();
        let orders = Key::from("orders");
        let billing = Key::from("billing");

        assert_eq!(counters.next(&orders), 0);
        assert_eq!(counters.next(&orders), 1);
        assert_eq!(counters.next(&billing), 0);
        assert_eq!(counters.next(&orders), 2);
    }

    #[test]
    fn test_round_robin_pick_cycles() {
        let balance = LoadBalance::new(LoadBalanceStrategy::RoundRobin);
        let key = Key::from("orders");
        let picks: Vec<usize> = (0..6).map(|_| balance.pick(3, &key).unwrap()).collect();
        assert_eq!(picks, [0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_random_pick_stays_in_bounds() {
        let balance = LoadBalance::new(LoadBalanceStrategy::Random);
        let key = Key::from("orders");
        for _ in 0..100 {
            assert!(balance.pick(4, &key).unwrap() < 4);
        }
    }

    #[test]
    fn test_none_strategy_and_empty_set() {
        let balance = LoadBalance::new(LoadBalanceStrategy::None);
        let key = Key::from("orders");
        assert_eq!(balance.pick(5, &key), Some(0));
        assert_eq!(balance.pick(0, &key), None);
    }
}
