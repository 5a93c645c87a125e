//! # Registrations: live selector/consumer bindings.
//!
//! A [`Registration`] is created by [`Registry::register`] and handed back
//! to the caller as a cancellation handle. The registry stays the source of
//! truth: cancelling through the handle removes the entry from the
//! registry's authoritative store and invalidates the affected match-cache
//! entries.
//!
//! ## State machine
//! ```text
//! Active ──► Cancelled (terminal)
//!   triggers: Registration::cancel(), Registry::unregister(key),
//!             Registry::clear(), automatic cancel after one delivery
//!             when cancel_after_use is set
//! ```
//!
//! [`Registry::register`]: crate::registry::Registry::register
//! [`Registry::unregister`]: crate::registry::Registry::unregister
//! [`Registry::clear`]: crate::registry::Registry::clear

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crate::consumers::ConsumerRef;
use crate::events::Key;
use crate::selectors::Selector;

use super::registry::RegistryShared;

/// Handle to a live (selector, consumer) binding inside a registry.
///
/// Clones share state: cancelling any clone cancels the binding.
#[derive(Clone)]
pub struct Registration {
    inner: Arc<RegistrationInner>,
}

struct RegistrationInner {
    id: u64,
    selector: Selector,
    consumer: ConsumerRef,
    cancelled: AtomicBool,
    cancel_after_use: AtomicBool,
    owner: Weak<RegistryShared>,
}

impl Registration {
    pub(crate) fn new(
        id: u64,
        selector: Selector,
        consumer: ConsumerRef,
        owner: Weak<RegistryShared>,
    ) -> Self {
        Self {
            inner: Arc::new(RegistrationInner {
                id,
                selector,
                consumer,
                cancelled: AtomicBool::new(false),
                cancel_after_use: AtomicBool::new(false),
                owner,
            }),
        }
    }

    /// Registry-unique identifier.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// The selector this binding was registered with.
    pub fn selector(&self) -> &Selector {
        &self.inner.selector
    }

    /// The registered consumer.
    pub fn consumer(&self) -> &ConsumerRef {
        &self.inner.consumer
    }

    /// True if the binding is live and its selector matches `key`.
    pub fn matches(&self, key: &Key) -> bool {
        !self.is_cancelled() && self.inner.selector.matches(key)
    }

    /// Marks this binding for automatic cancellation after one delivery.
    ///
    /// The router honors the flag after each delivery attempt, successful or
    /// failed.
    pub fn cancel_after_use(&self) -> &Self {
        self.inner.cancel_after_use.store(true, Ordering::Release);
        self
    }

    /// Whether the binding cancels itself after one delivery.
    pub fn is_cancel_after_use(&self) -> bool {
        self.inner.cancel_after_use.load(Ordering::Acquire)
    }

    /// Whether the binding has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Cancels the binding, removing it from its registry.
    ///
    /// Idempotent. A cancelled registration never matches again.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
            if let Some(owner) = self.inner.owner.upgrade() {
                owner.evict(self.inner.id);
            }
        }
    }

    /// Flips the cancelled flag without touching the owning registry.
    ///
    /// Used by the registry itself on paths that already hold its locks.
    pub(crate) fn mark_cancelled(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.inner.id)
            .field("selector", &self.inner.selector)
            .field("consumer", &self.inner.consumer.name())
            .field("cancelled", &self.is_cancelled())
            .field("cancel_after_use", &self.is_cancel_after_use())
            .finish()
    }
}
