//! # Filter contract.
//!
//! A [`Filter`] narrows the set of matched registrations before the router
//! delivers. Filters must be pure with respect to the input slice ordering:
//! they may drop or reorder, but they never invent registrations.

use std::sync::Arc;

use crate::events::Key;
use crate::registry::Registration;

/// Shared handle to a filter.
pub type FilterRef = Arc<dyn Filter>;

/// Narrows matched registrations before delivery.
pub trait Filter: Send + Sync + 'static {
    /// Returns the subset of `items` that should receive the event for `key`.
    fn filter(&self, items: Vec<Registration>, key: &Key) -> Vec<Registration>;

    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
