//! # Built-in narrowing strategies.
//!
//! - [`PassThroughFilter`] — keep everything (broadcast)
//! - [`FirstFilter`] — keep only the first match
//! - [`RandomFilter`] — keep one uniformly random match
//! - [`RoundRobinFilter`] — rotate through matches per key
//!
//! The single-winner strategies return an empty set for empty input instead
//! of failing; "nobody matched" is the registry's business, not the filter's.

use rand::Rng;

use crate::dispatch::RoundRobinCounters;
use crate::events::Key;
use crate::registry::Registration;

use super::filter::Filter;

/// Broadcast filter: every match receives the event.
#[derive(Debug, Default)]
pub struct PassThroughFilter;

impl Filter for PassThroughFilter {
    fn filter(&self, items: Vec<Registration>, _key: &Key) -> Vec<Registration> {
        items
    }

    fn name(&self) -> &str {
        "pass-through"
    }
}

/// Keeps only the first match, in registration order.
#[derive(Debug, Default)]
pub struct FirstFilter;

impl Filter for FirstFilter {
    fn filter(&self, mut items: Vec<Registration>, _key: &Key) -> Vec<Registration> {
        items.truncate(1);
        items
    }

    fn name(&self) -> &str {
        "first"
    }
}

/// Keeps one uniformly random match.
#[derive(Debug, Default)]
pub struct RandomFilter;

impl Filter for RandomFilter {
    fn filter(&self, mut items: Vec<Registration>, _key: &Key) -> Vec<Registration> {
        if items.is_empty() {
            return items;
        }
        let idx = rand::thread_rng().gen_range(0..items.len());
        vec![items.swap_remove(idx)]
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Rotates through the matches, one per publication, independently per key.
#[derive(Debug, Default)]
pub struct RoundRobinFilter {
    counters: RoundRobinCounters,
}

impl RoundRobinFilter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Filter for RoundRobinFilter {
    fn filter(&self, mut items: Vec<Registration>, key: &Key) -> Vec<Registration> {
        if items.is_empty() {
            return items;
        }
        let idx = (self.counters.next(key) % items.len() as u64) as usize;
        vec![items.swap_remove(idx)]
    }

    fn name(&self) -> &str {
        "round-robin"
    }
}
