//! # De-duplication filter.
//!
//! Keeps the first occurrence of each distinct consumer. Identity is the
//! innermost consumer behind any decorating proxies (see
//! [`Consume::underlying`](crate::Consume::underlying)), so the same handler
//! registered under several selectors or wrappers still runs once per event.

use std::collections::HashSet;

use crate::consumers::innermost;
use crate::events::Key;
use crate::registry::Registration;

use super::filter::Filter;

/// Drops later registrations of a consumer already seen for this event.
#[derive(Debug, Default)]
pub struct DeDuplicationFilter;

impl Filter for DeDuplicationFilter {
    fn filter(&self, items: Vec<Registration>, _key: &Key) -> Vec<Registration> {
        let mut seen: HashSet<usize> = HashSet::with_capacity(items.len());
        items
            .into_iter()
            .filter(|reg| {
                let identity = std::sync::Arc::as_ptr(innermost(reg.consumer())) as *const () as usize;
                seen.insert(identity)
            })
            .collect()
    }

    fn name(&self) -> &str {
        "de-duplication"
    }
}
