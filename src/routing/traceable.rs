//! # Tracing decorator for routers.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use crate::events::{Event, Key};
use crate::registry::Registration;

use super::router::{DispatchErrorHandler, Router};

/// Wraps a router and traces every routed event.
pub struct TraceableRouter {
    delegate: Arc<dyn Router>,
}

impl TraceableRouter {
    pub fn new(delegate: Arc<dyn Router>) -> Self {
        Self { delegate }
    }
}

#[async_trait]
impl Router for TraceableRouter {
    async fn route(
        &self,
        key: &Key,
        event: Event,
        registrations: Vec<Registration>,
        on_error: Option<DispatchErrorHandler>,
    ) {
        trace!(?key, event = event.id(), matched = registrations.len(), "routing event");
        self.delegate.route(key, event, registrations, on_error).await;
    }
}
