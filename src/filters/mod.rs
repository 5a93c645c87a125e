//! # Filters: narrowing matched consumers before delivery.
//!
//! The router hands every matched set through exactly one [`Filter`]:
//! - [`PassThroughFilter`] — broadcast (the default)
//! - [`FirstFilter`] — first match only
//! - [`RandomFilter`] — one random match
//! - [`RoundRobinFilter`] — per-key rotation (worker-pool semantics)
//! - [`DeDuplicationFilter`] — one delivery per distinct consumer
//! - [`TraceableFilter`] — tracing decorator around any of the above

mod dedup;
mod filter;
mod strategies;
mod traceable;

pub use dedup::DeDuplicationFilter;
pub use filter::{Filter, FilterRef};
pub use strategies::{FirstFilter, PassThroughFilter, RandomFilter, RoundRobinFilter};
pub use traceable::TraceableFilter;
