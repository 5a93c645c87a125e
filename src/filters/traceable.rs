//! # Tracing decorator for filters.

use tracing::trace;

use crate::events::Key;
use crate::registry::Registration;

use super::filter::{Filter, FilterRef};

/// Wraps a filter and traces every narrowing decision.
pub struct TraceableFilter {
    delegate: FilterRef,
}

impl TraceableFilter {
    pub fn new(delegate: FilterRef) -> Self {
        Self { delegate }
    }
}

impl Filter for TraceableFilter {
    fn filter(&self, items: Vec<Registration>, key: &Key) -> Vec<Registration> {
        let before = items.len();
        let out = self.delegate.filter(items, key);
        trace!(
            filter = self.delegate.name(),
            ?key,
            before,
            after = out.len(),
            "filter applied"
        );
        out
    }

    fn name(&self) -> &str {
        self.delegate.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FirstFilter;
    use std::sync::Arc;

    #[test]
    fn test_delegates_and_keeps_name() {
        let filter = TraceableFilter::new(Arc::new(FirstFilter));
        assert_eq!(filter.name(), "first");
        assert!(filter.filter(Vec::new(), &Key::from("k")).is_empty());
    }
}
