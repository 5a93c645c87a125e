//! # keybus
//!
//! **Keybus** is a selector-based publish/subscribe event bus for Rust.
//!
//! Producers notify events under a routing [`Key`]; consumers subscribe with
//! a [`Selector`] (exact value, type lineage, regex, URI path template,
//! predicate, set membership). Matched sets are narrowed by a [`Filter`],
//! ordered by priority, and delivered with per-consumer failure isolation.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  notify(key, event)              on(selector, consumer)
//!        │                                  │
//!        ▼                                  ▼
//! ┌─────────────────────┐        ┌─────────────────────────┐
//! │ LoadBalancedDispatch│        │ Registry                │
//! │  - queue pick:      │ select │  - L1: id → Registration│
//! │    random / rr / 0  │───────►│  - L2: key → matches    │
//! │  - N bounded queues │  (key) │    (invalidated on any  │
//! │  - 1 worker / queue │        │     mutation)           │
//! └──────────┬──────────┘        └─────────────────────────┘
//!            │ route(key, event, matches)
//!            ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │ FilteringRouter                                         │
//! │   filter (pass-through / first / random / round-robin / │
//! │           de-duplication)                               │
//! │   └─► sort by priority (stable)                         │
//! │        └─► deliver each: catch panics, report errors,   │
//! │            honor cancel_after_use                       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Request/reply
//! ```text
//! send_and_receive(key, event, reply_consumer)
//!   ├─► (selector, token) = Selector::anonymous()
//!   ├─► on(selector, reply_consumer).cancel_after_use()
//!   └─► notify(key, event.with_reply_to(token))
//!
//! receive(selector, transform)
//!   └─► on match: reply = transform(request)
//!         ├─ Ok(reply)  ─► notify(request.reply_to, reply)
//!         └─ Err(e)     ─► notify(TypeToken::of::<E>(), Event::wrap(e))
//! ```
//!
//! ## Features
//! | Area            | Description                                            | Key types / traits                          |
//! |-----------------|--------------------------------------------------------|---------------------------------------------|
//! | **Events**      | Envelope with key, headers, reply-to, erased payload.  | [`Event`], [`Key`], [`TypeToken`], [`Headers`] |
//! | **Selectors**   | Closed matching rules, header derivation.              | [`Selector`], [`UriPathTemplate`]            |
//! | **Consumers**   | Async handlers with priority and proxy identity.       | [`Consume`], [`FnConsumer`], [`ConsumerRef`] |
//! | **Registry**    | Two-level cached selector → consumer store.            | [`Registry`], [`Registration`]               |
//! | **Filters**     | Narrowing strategies before delivery.                  | [`Filter`], [`RoundRobinFilter`], ...        |
//! | **Routing**     | Priority ordering, failure isolation.                  | [`Router`], [`FilteringRouter`]              |
//! | **Dispatch**    | Bounded queues, load-balanced worker pool.             | [`Dispatch`], [`LoadBalancedDispatcher`]     |
//! | **Bus**         | Façade: notify, subscribe, request/reply.              | [`EventBus`], [`EventBusBuilder`]            |
//! | **Errors**      | Caller errors vs. in-flight handler failures.          | [`BusError`], [`HandlerError`]               |
//!
//! ## Example
//! ```rust
//! use keybus::{Event, EventBus, FnConsumer, Selector};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let bus = EventBus::new();
//!
//!     let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//!     bus.on(
//!         Selector::regex(r"order-(?P<id>[0-9]+)").unwrap(),
//!         FnConsumer::arc("orders", move |ev: Event| {
//!             let tx = tx.clone();
//!             async move {
//!                 let id = ev.headers().get("id").unwrap_or("?").to_owned();
//!                 let _ = tx.send(id);
//!                 Ok(())
//!             }
//!         }),
//!     );
//!
//!     bus.notify_key("order-42");
//!     assert_eq!(rx.recv().await.as_deref(), Some("42"));
//!     bus.shutdown().await;
//! }
//! ```

mod bus;
mod config;
mod consumers;
mod dispatch;
mod error;
mod events;
mod filters;
mod registry;
mod routing;
mod selectors;

pub use bus::{EventBus, EventBusBuilder};
pub use config::BusConfig;
pub use consumers::{Consume, ConsumerRef, FnConsumer};
pub use dispatch::{
    Dispatch, EventDispatcher, LoadBalanceStrategy, LoadBalancedDispatcher, RoundRobinCounters,
};
pub use error::{BusError, HandlerError};
pub use events::{Event, Headers, Key, Payload, TypeToken, ORIGIN};
pub use filters::{
    DeDuplicationFilter, Filter, FilterRef, FirstFilter, PassThroughFilter, RandomFilter,
    RoundRobinFilter, TraceableFilter,
};
pub use registry::{NotFoundHook, Registration, Registry};
pub use routing::{DispatchErrorHandler, FilteringRouter, Router, TraceableRouter};
pub use selectors::{PredicateFn, Selector, UriPathTemplate};
