//! # Event envelope.
//!
//! An [`Event`] wraps a payload together with the metadata the bus routes on:
//! a process-unique id, a creation timestamp, [`Headers`], the routing
//! [`Key`], and an optional reply-to key for request/reply flows.
//!
//! Payloads are type-erased (`Arc<dyn Any + Send + Sync>`) so one registry
//! can hold consumers for heterogeneous data; consumers recover the concrete
//! type with [`Event::data_as`].
//!
//! Events are transient: a producer creates one, zero or more consumers see
//! clones of it, then it is discarded. The routing key is set by the bus at
//! `notify` time; clones handed to consumers are never mutated afterwards.
//!
//! ## Example
//! ```rust
//! use keybus::Event;
//!
//! let ev = Event::wrap("payload".to_string());
//! assert_eq!(ev.data_as::<String>().as_deref(), Some(&"payload".to_string()));
//! assert!(ev.key().is_none());
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use super::headers::Headers;
use super::key::Key;

/// Global sequence counter for event ids.
static EVENT_IDS: AtomicU64 = AtomicU64::new(0);

/// Type-erased event payload.
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Envelope carrying a payload plus routing metadata.
#[derive(Clone)]
pub struct Event {
    id: u64,
    created_at: SystemTime,
    headers: Headers,
    key: Option<Key>,
    reply_to: Option<Key>,
    data: Option<Payload>,
}

impl Event {
    /// Creates an empty event with no payload.
    ///
    /// Used for bare-key notifications where only the key carries meaning.
    pub fn unit() -> Self {
        Self {
            id: EVENT_IDS.fetch_add(1, Ordering::Relaxed),
            created_at: SystemTime::now(),
            headers: Headers::new(),
            key: None,
            reply_to: None,
            data: None,
        }
    }

    /// Wraps `data` in a new event.
    pub fn wrap<T: Send + Sync + 'static>(data: T) -> Self {
        let mut ev = Self::unit();
        ev.data = Some(Arc::new(data));
        ev
    }

    /// Wraps `data` and sets the reply-to key in one step.
    pub fn wrap_reply<T: Send + Sync + 'static>(data: T, reply_to: impl Into<Key>) -> Self {
        Self::wrap(data).with_reply_to(reply_to)
    }

    /// Process-unique, monotonically increasing id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wall-clock creation time.
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// The routing key, once set by the bus.
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// The key interested parties should send replies to.
    pub fn reply_to(&self) -> Option<&Key> {
        self.reply_to.as_ref()
    }

    /// Read access to the headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access to the headers.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Sets the reply-to key.
    pub fn with_reply_to(mut self, reply_to: impl Into<Key>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    /// Replaces the headers wholesale.
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the routing key. Only the bus does this, at notify time.
    pub(crate) fn set_key(&mut self, key: Key) {
        self.key = Some(key);
    }

    /// Downcasts the payload to `T`.
    pub fn data_as<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.data
            .as_ref()
            .and_then(|d| Arc::clone(d).downcast::<T>().ok())
    }

    /// The raw type-erased payload.
    pub fn data(&self) -> Option<&Payload> {
        self.data.as_ref()
    }

    /// Copy of this event with a fresh id, same payload, same reply-to.
    pub fn copy(&self) -> Self {
        let mut ev = Self::unit();
        ev.headers = self.headers.clone();
        ev.reply_to = self.reply_to.clone();
        ev.data = self.data.clone();
        ev
    }

    /// Copy with a different payload, keeping the reply-to key.
    pub fn copy_with<T: Send + Sync + 'static>(&self, data: T) -> Self {
        let mut ev = self.copy();
        ev.data = Some(Arc::new(data));
        ev
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("reply_to", &self.reply_to)
            .field("headers", &self.headers)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let a = Event::unit();
        let b = Event::unit();
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_payload_downcast() {
        let ev = Event::wrap(42u32);
        assert_eq!(ev.data_as::<u32>().as_deref(), Some(&42));
        assert!(ev.data_as::<String>().is_none());
        assert!(Event::unit().data_as::<u32>().is_none());
    }

    #[test]
    fn test_copy_preserves_reply_to_and_data() {
        let ev = Event::wrap_reply("hello".to_string(), Key::anonymous());
        let copy = ev.copy();
        assert_eq!(copy.reply_to(), ev.reply_to());
        assert_eq!(
            copy.data_as::<String>().as_deref(),
            Some(&"hello".to_string())
        );
        assert_ne!(copy.id(), ev.id());
    }

    #[test]
    fn test_copy_with_replaces_data() {
        let ev = Event::wrap_reply(1u8, Key::from("replies"));
        let copy = ev.copy_with("two".to_string());
        assert_eq!(copy.reply_to(), Some(&Key::from("replies")));
        assert_eq!(copy.data_as::<String>().as_deref(), Some(&"two".to_string()));
        assert!(copy.data_as::<u8>().is_none());
    }
}
