//! # Dispatch: bounded queues between producers and routing.
//!
//! - [`Dispatch`] — producer-facing contract (`on_next` / `on_complete` /
//!   `on_cancel`)
//! - [`EventDispatcher`] — one bounded queue, one worker loop
//! - [`LoadBalancedDispatcher`] — pool of queues behind a pick strategy
//! - [`LoadBalanceStrategy`] / [`RoundRobinCounters`] — candidate selection

mod balance;
mod balanced;
mod dispatcher;

pub use balance::{LoadBalanceStrategy, RoundRobinCounters};
pub use balanced::LoadBalancedDispatcher;
pub use dispatcher::{Dispatch, EventDispatcher};
