//! # Bus builder.
//!
//! Assembles the registry, router and dispatcher pool behind an
//! [`EventBus`]. Every knob has a default; `EventBus::new()` is
//! `EventBus::builder().build()`.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use keybus::{BusConfig, EventBus, RoundRobinFilter};
//!
//! let mut cfg = BusConfig::default();
//! cfg.workers = 2;
//!
//! let bus = EventBus::builder()
//!     .id("payments")
//!     .config(cfg)
//!     .filter(Arc::new(RoundRobinFilter::new()))
//!     .build();
//! assert_eq!(bus.id(), "payments");
//! ```

use std::sync::Arc;

use crate::config::BusConfig;
use crate::dispatch::LoadBalancedDispatcher;
use crate::filters::{FilterRef, PassThroughFilter};
use crate::registry::{NotFoundHook, Registry};
use crate::routing::{DispatchErrorHandler, FilteringRouter, Router};

use super::bus::EventBus;

/// Builder for [`EventBus`].
pub struct EventBusBuilder {
    id: Option<String>,
    config: BusConfig,
    filter: FilterRef,
    on_error: Option<DispatchErrorHandler>,
    on_not_found: Option<NotFoundHook>,
    use_cache: bool,
}

impl EventBusBuilder {
    pub(crate) fn new() -> Self {
        Self {
            id: None,
            config: BusConfig::default(),
            filter: Arc::new(PassThroughFilter),
            on_error: None,
            on_not_found: None,
            use_cache: true,
        }
    }

    /// Sets the bus id carried in the origin header of notified events.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Replaces the dispatch topology configuration.
    pub fn config(mut self, config: BusConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the filter applied to every matched consumer set.
    ///
    /// Defaults to [`PassThroughFilter`] (broadcast).
    pub fn filter(mut self, filter: FilterRef) -> Self {
        self.filter = filter;
        self
    }

    /// Receives every consumer failure (error or panic) instead of the log.
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(crate::error::HandlerError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(handler));
        self
    }

    /// Fires when a notified key matches no consumer.
    pub fn on_not_found<F>(mut self, hook: F) -> Self
    where
        F: Fn(&crate::events::Key) + Send + Sync + 'static,
    {
        self.on_not_found = Some(Arc::new(hook));
        self
    }

    /// Disables the registry's memoizing match cache.
    pub fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    /// Builds the bus and spawns its dispatch workers.
    ///
    /// Must run inside a tokio runtime.
    pub fn build(self) -> EventBus {
        let registry = Registry::with_options(self.use_cache, self.on_not_found);
        let router: Arc<dyn Router> = Arc::new(
            FilteringRouter::new(self.filter).spawn_handlers(self.config.spawn_handlers),
        );
        let dispatcher = LoadBalancedDispatcher::new(
            registry.clone(),
            router,
            self.config.resolved_workers(),
            self.config.queue_capacity,
            self.config.strategy,
            self.on_error,
        );
        EventBus::assemble(self.id, registry, dispatcher)
    }
}
