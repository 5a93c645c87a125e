//! # Event headers.
//!
//! Case-insensitive, name-ordered string metadata attached to every
//! [`Event`](crate::Event). Selector-derived values (regex capture groups,
//! URI path variables) land here just before a consumer runs, alongside
//! whatever the producer set.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Header carrying the logical origin of an event (the notifying bus id).
pub const ORIGIN: &str = "x-bus-origin";

/// Header name with case-insensitive ordering and equality.
#[derive(Clone)]
struct Name(String);

impl Name {
    fn iter_lower(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.bytes().map(|b| b.to_ascii_lowercase())
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Name {}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter_lower().cmp(other.iter_lower())
    }
}

/// Ordered, case-insensitive name/value pairs.
#[derive(Clone, Default)]
pub struct Headers {
    entries: BTreeMap<Name, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks a header up by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&Name(name.to_owned()))
            .map(String::as_str)
    }

    /// Sets a header, replacing any case-variant of the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = Name(name.into());
        self.entries.remove(&name);
        self.entries.insert(name, value.into());
    }

    /// Removes a header by name, ignoring case.
    pub fn unset(&mut self, name: &str) {
        self.entries.remove(&Name(name.to_owned()));
    }

    /// Applies a batch of updates; a `None` value removes the header.
    pub fn set_all<I, N>(&mut self, updates: I)
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Option<String>)>,
    {
        for (name, value) in updates {
            let name: String = name.into();
            match value {
                Some(v) => self.set(name, v),
                None => self.unset(&name),
            }
        }
    }

    /// Sets the [`ORIGIN`] header.
    pub fn set_origin(&mut self, origin: impl Into<String>) {
        self.set(ORIGIN, origin);
    }

    /// The [`ORIGIN`] header, if set.
    pub fn origin(&self) -> Option<&str> {
        self.get(ORIGIN)
    }

    /// True if the header is present (case-insensitive).
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates name/value pairs in case-insensitive name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.0.as_str(), value.as_str()))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/plain");
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
        assert!(headers.contains("Content-type"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_case_variant_replaces_existing() {
        let mut headers = Headers::new();
        headers.set("trace-id", "a");
        headers.set("Trace-ID", "b");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("trace-id"), Some("b"));
        // The latest spelling wins.
        let names: Vec<&str> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["Trace-ID"]);
    }

    #[test]
    fn test_set_all_none_removes() {
        let mut headers = Headers::new();
        headers.set("keep", "1");
        headers.set("drop", "2");
        headers.set_all([
            ("drop", None),
            ("add", Some("3".to_string())),
        ]);
        assert!(!headers.contains("drop"));
        assert_eq!(headers.get("add"), Some("3"));
        assert_eq!(headers.get("keep"), Some("1"));
    }

    #[test]
    fn test_origin_round_trip() {
        let mut headers = Headers::new();
        assert!(headers.origin().is_none());
        headers.set_origin("bus-1");
        assert_eq!(headers.origin(), Some("bus-1"));
        assert_eq!(headers.get("X-Bus-Origin"), Some("bus-1"));
    }

    #[test]
    fn test_iteration_is_name_ordered() {
        let headers: Headers = [("b", "2"), ("A", "1"), ("c", "3")]
            .into_iter()
            .collect();
        let names: Vec<&str> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["A", "b", "c"]);
    }
}
