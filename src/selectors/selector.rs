//! # Selectors: predicates over routing keys.
//!
//! A [`Selector`] decides whether a registration matches a notified [`Key`],
//! and can derive metadata ([headers](crate::Headers)) from a matched key.
//! The variant set is closed — the registry and router never grow new
//! matching rules at runtime — which keeps `matches` exhaustive and cheap.
//!
//! | Variant | Match rule | Headers |
//! |---|---|---|
//! | [`Selector::value`] | key equality | — |
//! | [`Selector::typed`] | key is the type or a subtype | — |
//! | [`Selector::regex`] | pattern fully matches the key's string form | capture groups |
//! | [`Selector::uri_path`] | template matches the string key | path variables |
//! | [`Selector::predicate`] | supplied function of the key | — |
//! | [`Selector::membership`] | key contained in a set | — |
//! | [`Selector::match_all`] | always | — |
//! | [`Selector::anonymous`] | exactly one process-unique token | — |
//!
//! `matches` is deterministic, side-effect-free and never panics.
//!
//! ## Example
//! ```rust
//! use keybus::{Key, Selector};
//!
//! let sel = Selector::regex("order-([0-9]+)").unwrap();
//! assert!(sel.matches(&Key::from("order-42")));
//! assert!(!sel.matches(&Key::from("order-42-extra")));
//!
//! let headers = sel.resolve_headers(&Key::from("order-42")).unwrap();
//! assert!(headers.contains(&("group1".to_string(), "42".to_string())));
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::BusError;
use crate::events::{Key, TypeToken};

use super::uri_path::UriPathTemplate;

/// Boxed key predicate used by [`Selector::predicate`].
pub type PredicateFn = Arc<dyn Fn(&Key) -> bool + Send + Sync>;

/// Predicate over routing keys, optionally deriving headers from a match.
#[derive(Clone)]
pub enum Selector {
    /// Matches a key equal to the stored one.
    Value(Key),
    /// Matches type keys that are the stored type or a subtype of it.
    Type(TypeToken),
    /// Matches keys whose string form fully matches the pattern.
    Regex(Regex),
    /// Matches string keys against a path template with `{var}` segments.
    UriPath(UriPathTemplate),
    /// Delegates to a supplied predicate.
    Predicate(PredicateFn),
    /// Matches keys contained in the stored set.
    Membership(Arc<HashSet<Key>>),
    /// Matches every key.
    MatchAll,
    /// Matches exactly one process-unique token key.
    Anonymous(u64),
}

impl Selector {
    /// Selector matching keys equal to `key`.
    pub fn value(key: impl Into<Key>) -> Self {
        Selector::Value(key.into())
    }

    /// Selector matching `token` and any of its subtypes.
    pub fn typed(token: TypeToken) -> Self {
        Selector::Type(token)
    }

    /// Selector matching keys whose string form fully matches `pattern`.
    ///
    /// The pattern is anchored (`^(?:pattern)$`), so partial matches do not
    /// count; capture-group numbering is unaffected.
    pub fn regex(pattern: &str) -> Result<Self, BusError> {
        let anchored = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Selector::Regex(anchored))
    }

    /// Selector matching string keys against a `/seg/{var}/...` template.
    pub fn uri_path(template: &str) -> Result<Self, BusError> {
        Ok(Selector::UriPath(UriPathTemplate::new(template)?))
    }

    /// Selector delegating to `predicate`.
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&Key) -> bool + Send + Sync + 'static,
    {
        Selector::Predicate(Arc::new(predicate))
    }

    /// Selector matching any key in `keys`.
    pub fn membership<I, K>(keys: I) -> Self
    where
        K: Into<Key>,
        I: IntoIterator<Item = K>,
    {
        Selector::Membership(Arc::new(keys.into_iter().map(Into::into).collect()))
    }

    /// Selector matching every key.
    pub fn match_all() -> Self {
        Selector::MatchAll
    }

    /// Allocates an anonymous selector together with the only key it matches.
    ///
    /// Backs the request/reply pattern: tokens are process-unique, so two
    /// anonymous selectors never collide.
    pub fn anonymous() -> (Self, Key) {
        let key = Key::anonymous();
        let token = match key {
            Key::Token(n) => n,
            // Key::anonymous always yields a token.
            _ => unreachable!(),
        };
        (Selector::Anonymous(token), key)
    }

    /// The comparison operand, for variants that store one.
    pub fn operand(&self) -> Option<Key> {
        match self {
            Selector::Value(k) => Some(k.clone()),
            Selector::Type(t) => Some(Key::Type(t.clone())),
            Selector::Anonymous(n) => Some(Key::Token(*n)),
            _ => None,
        }
    }

    /// True if this selector matches `key`.
    pub fn matches(&self, key: &Key) -> bool {
        match self {
            Selector::Value(v) => v == key,
            Selector::Type(t) => key
                .as_type()
                .map(|k| k.is_subtype_of(t))
                .unwrap_or(false),
            Selector::Regex(re) => re.is_match(&key.to_string()),
            Selector::UriPath(t) => key.as_str().map(|s| t.matches(s)).unwrap_or(false),
            Selector::Predicate(f) => f(key),
            Selector::Membership(set) => set.contains(key),
            Selector::MatchAll => true,
            Selector::Anonymous(n) => matches!(key, Key::Token(t) if t == n),
        }
    }

    /// Headers derived from a matched key, for variants that produce them.
    ///
    /// Regex selectors expose capture groups as `group0` (the full match)
    /// through `groupN`, plus any named groups under their own names. URI
    /// path selectors expose path variables by name. Everything else, and
    /// any non-matching key, yields `None`.
    pub fn resolve_headers(&self, key: &Key) -> Option<Vec<(String, String)>> {
        match self {
            Selector::Regex(re) => {
                let text = key.to_string();
                let caps = re.captures(&text)?;
                let mut headers = Vec::new();
                for (i, group) in caps.iter().enumerate() {
                    if let Some(m) = group {
                        headers.push((format!("group{i}"), m.as_str().to_string()));
                    }
                }
                for name in re.capture_names().flatten() {
                    if let Some(m) = caps.name(name) {
                        headers.push((name.to_string(), m.as_str().to_string()));
                    }
                }
                Some(headers)
            }
            Selector::UriPath(t) => key.as_str().and_then(|s| t.capture(s)),
            _ => None,
        }
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Value(k) => f.debug_tuple("Value").field(k).finish(),
            Selector::Type(t) => f.debug_tuple("Type").field(&t.name()).finish(),
            Selector::Regex(re) => f.debug_tuple("Regex").field(&re.as_str()).finish(),
            Selector::UriPath(t) => f.debug_tuple("UriPath").field(&t.source()).finish(),
            Selector::Predicate(_) => f.write_str("Predicate(..)"),
            Selector::Membership(set) => write!(f, "Membership({} keys)", set.len()),
            Selector::MatchAll => f.write_str("MatchAll"),
            Selector::Anonymous(n) => f.debug_tuple("Anonymous").field(n).finish(),
        }
    }
}
