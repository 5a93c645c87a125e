//! # Event data model: keys, headers, envelopes.
//!
//! This module groups the types an event carries through the bus:
//! - [`Key`] / [`TypeToken`] — routing keys and explicit type descriptors
//! - [`Headers`] — ordered, case-insensitive name/value metadata
//! - [`Event`] / [`Payload`] — the envelope and its type-erased payload
//!
//! Routing behavior lives elsewhere: selectors match keys
//! (`crate::selectors`), the registry stores who listens
//! (`crate::registry`), and dispatchers move envelopes
//! (`crate::dispatch`).

mod event;
mod headers;
mod key;

pub use event::{Event, Payload};
pub use headers::{Headers, ORIGIN};
pub use key::{Key, TypeToken};
