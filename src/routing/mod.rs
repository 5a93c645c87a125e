//! # Routing: from matched registrations to consumer invocations.
//!
//! - [`Router`] — delivery contract the dispatcher drives
//! - [`FilteringRouter`] — filter, priority-sort, deliver with isolation
//! - [`TraceableRouter`] — tracing decorator
//! - [`DispatchErrorHandler`] — sink for handler errors and caught panics

mod filtering;
mod router;
mod traceable;

pub use filtering::FilteringRouter;
pub use router::{DispatchErrorHandler, Router};
pub use traceable::TraceableRouter;
