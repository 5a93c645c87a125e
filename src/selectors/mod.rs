//! # Selector family.
//!
//! This module provides the matching side of the bus:
//! - [`Selector`] — the closed set of key-matching rules
//! - [`UriPathTemplate`] — compiled `/seg/{var}` templates used by the
//!   URI path variant
//!
//! Selectors pair with consumers inside a
//! [`Registry`](crate::registry::Registry); the registry asks `matches`, the
//! bus asks `resolve_headers` just before a consumer runs.

mod selector;
mod uri_path;

pub use selector::{PredicateFn, Selector};
pub use uri_path::UriPathTemplate;
