//! # The bus façade.
//!
//! [`EventBus`] wires the pieces together:
//!
//! ```text
//! notify(key, event)                         on(selector, consumer)
//!        │                                           │
//!        ▼                                           ▼
//! ┌────────────────┐   select(key)   ┌──────────────────────────┐
//! │ dispatcher pool │ ──────────────► │ registry (L1 + L2 cache) │
//! └────────────────┘                  └──────────────────────────┘
//!        │ route
//!        ▼
//! ┌────────────────┐  filter → sort → deliver (isolated)
//! │ router         │
//! └────────────────┘
//! ```
//!
//! ## Rules
//! - `notify` never blocks and never fails; overflow drops with a warning.
//! - Consumers registered through [`EventBus::on`] see selector-derived
//!   headers (regex groups, path variables) merged into the event.
//! - Request/reply ([`EventBus::send_and_receive`]) registers a one-shot
//!   anonymous consumer; the registration cancels itself after the reply.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::consumers::{Consume, ConsumerRef, FnConsumer};
use crate::dispatch::{Dispatch, LoadBalancedDispatcher};
use crate::error::{BusError, HandlerError};
use crate::events::{Event, Key, TypeToken};
use crate::registry::{Registration, Registry};
use crate::selectors::Selector;

use super::builder::EventBusBuilder;

static BUS_IDS: AtomicU64 = AtomicU64::new(0);

/// Selector-routed publish/subscribe bus.
///
/// Cheap to clone; clones share the registry and dispatcher pool.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

struct BusInner {
    id: String,
    registry: Registry,
    dispatcher: LoadBalancedDispatcher,
}

impl EventBus {
    /// A bus with default configuration. Must run inside a tokio runtime.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a configured bus.
    pub fn builder() -> EventBusBuilder {
        EventBusBuilder::new()
    }

    pub(crate) fn assemble(
        id: Option<String>,
        registry: Registry,
        dispatcher: LoadBalancedDispatcher,
    ) -> Self {
        let id = id.unwrap_or_else(|| format!("bus-{}", BUS_IDS.fetch_add(1, Ordering::Relaxed)));
        Self {
            inner: Arc::new(BusInner {
                id,
                registry,
                dispatcher,
            }),
        }
    }

    /// The bus id, stamped into the origin header of notified events.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Subscribes `consumer` to every key `selector` matches.
    ///
    /// Before each delivery, headers the selector derives from the matched
    /// key (regex capture groups, path variables) are merged into the event.
    pub fn on(&self, selector: Selector, consumer: ConsumerRef) -> Registration {
        let proxy: ConsumerRef = Arc::new(EnrichingConsumer {
            selector: selector.clone(),
            delegate: consumer,
        });
        self.inner.registry.register(selector, proxy)
    }

    /// Publishes `event` under `key`. Non-blocking; drops on overflow.
    pub fn notify(&self, key: impl Into<Key>, mut event: Event) {
        event.set_key(key.into());
        if event.headers().origin().is_none() {
            event.headers_mut().set_origin(self.id());
        }
        self.inner.dispatcher.on_next(event);
    }

    /// Publishes the event produced by `supplier` under `key`.
    pub fn notify_with<F>(&self, key: impl Into<Key>, supplier: F)
    where
        F: FnOnce() -> Event,
    {
        self.notify(key, supplier());
    }

    /// Publishes an empty event; only the key carries meaning.
    pub fn notify_key(&self, key: impl Into<Key>) {
        self.notify(key, Event::unit());
    }

    /// Re-publishes an event under the key it already carries.
    pub fn renotify(&self, event: Event) -> Result<(), BusError> {
        let key = event.key().cloned().ok_or(BusError::MissingKey)?;
        self.notify(key, event);
        Ok(())
    }

    /// Publishes every event of `stream`, keyed per item, until it ends.
    pub fn notify_stream<S, F>(&self, stream: S, key_fn: F) -> JoinHandle<()>
    where
        S: Stream<Item = Event> + Send + 'static,
        F: Fn(&Event) -> Key + Send + 'static,
    {
        let bus = self.clone();
        tokio::spawn(async move {
            futures::pin_mut!(stream);
            while let Some(event) = stream.next().await {
                let key = key_fn(&event);
                bus.notify(key, event);
            }
        })
    }

    /// Publishes the reply-carrying event produced by `supplier` under `key`.
    pub fn send_with<F>(&self, key: impl Into<Key>, supplier: F)
    where
        F: FnOnce() -> Event,
    {
        self.send(key, supplier());
    }

    /// Publishes a reply-carrying event under `key`.
    ///
    /// Same delivery as [`EventBus::notify`]; logs a warning when the event
    /// has no reply-to key, since nothing will ever answer it.
    pub fn send(&self, key: impl Into<Key>, event: Event) {
        if event.reply_to().is_none() {
            warn!(bus = self.id(), event = event.id(), "sent event has no reply-to key");
        }
        self.notify(key, event);
    }

    /// Registers a replier: `transform` runs on each matched request and its
    /// output is published to the request's reply-to key.
    ///
    /// A failed transform is published under the error's type key
    /// (`TypeToken::of::<E>()`), so error consumers can subscribe to it.
    pub fn receive<F, E>(&self, selector: Selector, transform: F) -> Registration
    where
        F: Fn(Event) -> Result<Event, E> + Send + Sync + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        let bus = self.clone();
        let consumer = FnConsumer::arc("receive", move |event: Event| {
            let reply_to = event.reply_to().cloned();
            let outcome = transform(event);
            let bus = bus.clone();
            async move {
                match outcome {
                    Ok(reply) => match reply_to {
                        Some(key) => bus.notify(key, reply),
                        None => {
                            warn!(bus = bus.id(), "reply produced for a request without reply-to key");
                        }
                    },
                    Err(err) => {
                        bus.notify(Key::Type(TypeToken::of::<E>()), Event::wrap(err));
                    }
                }
                Ok(())
            }
        });
        self.on(selector, consumer)
    }

    /// One round trip: publishes `event` under `key` and delivers the single
    /// reply to `reply`.
    ///
    /// The reply consumer listens on a process-unique anonymous key and its
    /// registration cancels itself after the first delivery. The returned
    /// handle lets the caller cancel early if no reply is expected anymore.
    pub fn send_and_receive(
        &self,
        key: impl Into<Key>,
        event: Event,
        reply: ConsumerRef,
    ) -> Registration {
        let (selector, token) = Selector::anonymous();
        let registration = self.on(selector, reply);
        registration.cancel_after_use();
        self.notify(key, event.with_reply_to(token));
        registration
    }

    /// True if at least one live consumer matches `key`.
    pub fn responds_to_key(&self, key: &Key) -> bool {
        !self.inner.registry.select(key).is_empty()
    }

    /// Drains the dispatch queues, then stops the workers.
    ///
    /// Events published after this call are dropped.
    pub async fn shutdown(&self) {
        self.inner.dispatcher.on_complete();
        self.inner.dispatcher.join().await;
    }

    /// Stops the workers immediately, discarding queued events.
    pub async fn abort(&self) {
        self.inner.dispatcher.on_cancel();
        self.inner.dispatcher.join().await;
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("id", &self.inner.id)
            .field("consumers", &self.inner.registry.len())
            .field("workers", &self.inner.dispatcher.workers())
            .finish()
    }
}

/// Merges selector-derived headers into the event before delegating.
struct EnrichingConsumer {
    selector: Selector,
    delegate: ConsumerRef,
}

#[async_trait]
impl Consume for EnrichingConsumer {
    async fn on_event(&self, mut event: Event) -> Result<(), HandlerError> {
        let derived = event
            .key()
            .and_then(|key| self.selector.resolve_headers(key));
        if let Some(headers) = derived {
            event
                .headers_mut()
                .set_all(headers.into_iter().map(|(n, v)| (n, Some(v))));
        }
        self.delegate.on_event(event).await
    }

    fn priority(&self) -> i32 {
        self.delegate.priority()
    }

    fn name(&self) -> &str {
        self.delegate.name()
    }

    fn underlying(&self) -> Option<&ConsumerRef> {
        Some(&self.delegate)
    }
}
