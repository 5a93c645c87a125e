//! # Consumer registry with a two-level lookup path.
//!
//! ```text
//! register(selector, consumer)
//!        │
//!        ▼
//! ┌─────────────────────────────┐
//! │ L1: id → Registration       │  authoritative, insertion-ordered
//! └─────────────────────────────┘
//!        │ select(key): scan on L2 miss
//!        ▼
//! ┌─────────────────────────────┐
//! │ L2: Key → Vec<Registration> │  memoized match results
//! └─────────────────────────────┘
//! ```
//!
//! ## Rules
//! - L1 is the source of truth; L2 only memoizes non-empty `select` results.
//! - Every mutation (register, unregister, cancel, clear) invalidates the L2
//!   entries it could have affected, so a hit never returns a stale set.
//! - `select` returns registrations in registration order; routers re-order
//!   by priority afterwards.
//!
//! ### Notes
//! A generation counter guards the scan-then-populate path: if any mutation
//! lands between the L1 scan and the L2 insert, the insert is skipped rather
//! than caching a result that no longer reflects the store.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::consumers::ConsumerRef;
use crate::events::Key;
use crate::selectors::Selector;

use super::registration::Registration;

/// Callback fired when `select` finds no consumer for a key.
pub type NotFoundHook = Arc<dyn Fn(&Key) + Send + Sync>;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) struct RegistryShared {
    /// Authoritative store, keyed by registration id (monotonic, so
    /// iteration follows registration order).
    l1: RwLock<BTreeMap<u64, Registration>>,
    /// Memoized non-empty match results per key.
    l2: RwLock<HashMap<Key, Vec<Registration>>>,
    use_l2: bool,
    next_id: AtomicU64,
    /// Bumped under the L1 write lock on every mutation.
    generation: AtomicU64,
    on_not_found: Option<NotFoundHook>,
}

impl RegistryShared {
    /// Removes a registration by id and drops every L2 entry that contains it.
    ///
    /// Called from [`Registration::cancel`]; must not be called while holding
    /// either lock.
    pub(crate) fn evict(&self, id: u64) {
        let removed = {
            let mut l1 = write(&self.l1);
            self.generation.fetch_add(1, Ordering::AcqRel);
            l1.remove(&id)
        };
        if removed.is_some() {
            if self.use_l2 {
                let mut l2 = write(&self.l2);
                l2.retain(|_, regs| !regs.iter().any(|r| r.id() == id));
            }
            debug!(id, "registration cancelled");
        }
    }
}

/// Thread-safe consumer registry.
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct Registry {
    shared: Arc<RegistryShared>,
}

impl Registry {
    /// Creates a registry with the match cache enabled and no miss hook.
    pub fn new() -> Self {
        Self::with_options(true, None)
    }

    /// Creates a registry with explicit cache and miss-hook settings.
    ///
    /// With `use_cache` off every `select` scans the authoritative store;
    /// useful when selectors match huge, rarely-repeated key spaces.
    pub fn with_options(use_cache: bool, on_not_found: Option<NotFoundHook>) -> Self {
        Self {
            shared: Arc::new(RegistryShared {
                l1: RwLock::new(BTreeMap::new()),
                l2: RwLock::new(HashMap::new()),
                use_l2: use_cache,
                next_id: AtomicU64::new(1),
                generation: AtomicU64::new(0),
                on_not_found,
            }),
        }
    }

    /// Binds a consumer to a selector and returns the cancellation handle.
    ///
    /// Any cached result for a key the new selector matches is invalidated.
    pub fn register(&self, selector: Selector, consumer: ConsumerRef) -> Registration {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let reg = Registration::new(
            id,
            selector,
            consumer,
            Arc::downgrade(&self.shared),
        );

        {
            let mut l1 = write(&self.shared.l1);
            self.shared.generation.fetch_add(1, Ordering::AcqRel);
            l1.insert(id, reg.clone());
        }
        if self.shared.use_l2 {
            let mut l2 = write(&self.shared.l2);
            l2.retain(|key, _| !reg.selector().matches(key));
        }

        debug!(id, consumer = reg.consumer().name(), "consumer registered");
        reg
    }

    /// Cancels every live registration whose selector matches `key`.
    ///
    /// Returns `true` if at least one registration was removed.
    pub fn unregister(&self, key: &Key) -> bool {
        let removed: Vec<u64> = {
            let mut l1 = write(&self.shared.l1);
            self.shared.generation.fetch_add(1, Ordering::AcqRel);
            let ids: Vec<u64> = l1
                .values()
                .filter(|r| r.matches(key))
                .map(|r| r.id())
                .collect();
            for id in &ids {
                if let Some(reg) = l1.remove(id) {
                    reg.mark_cancelled();
                }
            }
            ids
        };
        if removed.is_empty() {
            return false;
        }

        if self.shared.use_l2 {
            let mut l2 = write(&self.shared.l2);
            l2.retain(|_, regs| !regs.iter().any(|r| removed.contains(&r.id())));
        }
        debug!(?key, count = removed.len(), "consumers unregistered");
        true
    }

    /// Returns the live registrations matching `key`, in registration order.
    ///
    /// On a cache miss the authoritative store is scanned and a non-empty
    /// result is memoized. An empty result fires the not-found hook and is
    /// never cached.
    pub fn select(&self, key: &Key) -> Vec<Registration> {
        if self.shared.use_l2 {
            let l2 = read(&self.shared.l2);
            if let Some(regs) = l2.get(key) {
                return regs.iter().filter(|r| !r.is_cancelled()).cloned().collect();
            }
        }

        let generation = self.shared.generation.load(Ordering::Acquire);
        let matched: Vec<Registration> = {
            let l1 = read(&self.shared.l1);
            l1.values().filter(|r| r.matches(key)).cloned().collect()
        };

        if matched.is_empty() {
            if let Some(hook) = &self.shared.on_not_found {
                hook(key);
            }
            debug!(?key, "no consumer matched");
            return matched;
        }

        if self.shared.use_l2 {
            let mut l2 = write(&self.shared.l2);
            if self.shared.generation.load(Ordering::Acquire) == generation {
                l2.insert(key.clone(), matched.clone());
            }
        }
        matched
    }

    /// Snapshot of all live registrations, in registration order.
    pub fn registrations(&self) -> Vec<Registration> {
        let l1 = read(&self.shared.l1);
        l1.values().filter(|r| !r.is_cancelled()).cloned().collect()
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        read(&self.shared.l1).len()
    }

    /// True if the registry holds no registrations.
    pub fn is_empty(&self) -> bool {
        read(&self.shared.l1).is_empty()
    }

    /// Cancels everything and drops the whole match cache.
    pub fn clear(&self) {
        let drained: Vec<Registration> = {
            let mut l1 = write(&self.shared.l1);
            self.shared.generation.fetch_add(1, Ordering::AcqRel);
            let regs = l1.values().cloned().collect();
            l1.clear();
            regs
        };
        for reg in &drained {
            reg.mark_cancelled();
        }
        if self.shared.use_l2 {
            write(&self.shared.l2).clear();
        }
        debug!(count = drained.len(), "registry cleared");
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("len", &self.len())
            .field("use_cache", &self.shared.use_l2)
            .finish()
    }
}
