//! # Router contract.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::events::{Event, Key};
use crate::registry::Registration;

/// Callback receiving every delivery failure (handler error or panic).
pub type DispatchErrorHandler = Arc<dyn Fn(HandlerError) + Send + Sync>;

/// Delivers one event to the registrations matched for its key.
#[async_trait]
pub trait Router: Send + Sync + 'static {
    /// Routes `event` to `registrations`.
    ///
    /// Must never propagate a consumer failure: errors and panics go to
    /// `on_error` (or the log) and the remaining consumers still run.
    async fn route(
        &self,
        key: &Key,
        event: Event,
        registrations: Vec<Registration>,
        on_error: Option<DispatchErrorHandler>,
    );
}
