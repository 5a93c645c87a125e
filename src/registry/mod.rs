//! # Registry: selector → consumer bindings.
//!
//! - [`Registry`] — thread-safe store with a memoizing match cache
//! - [`Registration`] — cancellation handle for a single binding
//! - [`NotFoundHook`] — callback for keys no selector matches
//!
//! The dispatcher asks the registry for the consumers of every published
//! key; everything else (filtering, ordering, delivery) happens downstream
//! in the router.

mod registration;
mod registry;

pub use registration::Registration;
pub use registry::{NotFoundHook, Registry};
