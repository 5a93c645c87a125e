//! Error types used by the bus and its consumers.
//!
//! Two kinds of failure flow through this crate:
//!
//! - [`BusError`] — caller-facing errors raised synchronously (bad selector
//!   patterns, renotifying a key-less event). These surface at the call site.
//! - [`HandlerError`] — failures produced *inside* a consumer during
//!   delivery. These never reach the producer; the router hands them to the
//!   configured dispatch error handler or logs them.

use thiserror::Error;

/// Failure produced by a consumer while handling an event.
///
/// Routed to the dispatch error handler if one is configured, otherwise
/// logged and discarded. Never propagates to the producer and never stops
/// delivery to sibling consumers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced synchronously to bus callers.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BusError {
    /// A regex selector pattern failed to compile.
    #[error("invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A URI path template could not be parsed.
    #[error("invalid path template {template:?}: {reason}")]
    InvalidTemplate {
        /// The offending template string.
        template: String,
        /// What was wrong with it.
        reason: String,
    },

    /// An event without a routing key was handed back to the bus.
    #[error("event has no routing key")]
    MissingKey,
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::InvalidPattern(_) => "invalid_pattern",
            BusError::InvalidTemplate { .. } => "invalid_template",
            BusError::MissingKey => "missing_key",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let err = BusError::MissingKey;
        assert_eq!(err.as_label(), "missing_key");

        let err = BusError::InvalidTemplate {
            template: "/a/{".to_string(),
            reason: "unclosed variable".to_string(),
        };
        assert_eq!(err.as_label(), "invalid_template");
        assert!(err.to_string().contains("/a/{"));
    }
}
