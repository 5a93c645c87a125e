//! # URI path templates.
//!
//! A [`UriPathTemplate`] matches slash-separated string keys against a
//! template whose segments are either literals or `{variable}` captures:
//!
//! ```text
//! template:  /orders/{id}/items
//! matches:   /orders/42/items      → { id: "42" }
//! rejects:   /orders/42            (segment count differs)
//! rejects:   /orders/42/lines     (literal mismatch)
//! ```
//!
//! Captured variables become event headers when the selector fires.

use crate::error::BusError;

/// One template segment.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// Compiled URI path template.
#[derive(Clone, Debug)]
pub struct UriPathTemplate {
    source: String,
    segments: Vec<Segment>,
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.trim_matches('/').split('/').filter(|s| !s.is_empty())
}

impl UriPathTemplate {
    /// Parses `template` into segments.
    ///
    /// Fails on unclosed or empty `{}` variables and on braces embedded in
    /// the middle of a segment.
    pub fn new(template: &str) -> Result<Self, BusError> {
        let invalid = |reason: &str| BusError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        for seg in split(template) {
            if let Some(inner) = seg.strip_prefix('{') {
                let name = inner
                    .strip_suffix('}')
                    .ok_or_else(|| invalid("unclosed variable segment"))?;
                if name.is_empty() {
                    return Err(invalid("empty variable name"));
                }
                if name.contains(['{', '}']) {
                    return Err(invalid("nested braces in variable name"));
                }
                segments.push(Segment::Variable(name.to_string()));
            } else if seg.contains(['{', '}']) {
                return Err(invalid("braces must span a whole segment"));
            } else {
                segments.push(Segment::Literal(seg.to_string()));
            }
        }
        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// The template string this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// True if `path` matches segment-for-segment.
    pub fn matches(&self, path: &str) -> bool {
        let mut segs = self.segments.iter();
        for part in split(path) {
            match segs.next() {
                Some(Segment::Literal(lit)) if lit == part => {}
                Some(Segment::Variable(_)) => {}
                _ => return false,
            }
        }
        segs.next().is_none()
    }

    /// Captured variables for `path`, or `None` if it does not match.
    pub fn capture(&self, path: &str) -> Option<Vec<(String, String)>> {
        if !self.matches(path) {
            return None;
        }
        let vars = split(path)
            .zip(&self.segments)
            .filter_map(|(part, seg)| match seg {
                Segment::Variable(name) => Some((name.clone(), part.to_string())),
                Segment::Literal(_) => None,
            })
            .collect();
        Some(vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_match() {
        let t = UriPathTemplate::new("/orders/new").unwrap();
        assert!(t.matches("/orders/new"));
        assert!(t.matches("orders/new"));
        assert!(!t.matches("/orders/old"));
        assert!(!t.matches("/orders/new/extra"));
        assert!(!t.matches("/orders"));
    }

    #[test]
    fn test_variable_capture() {
        let t = UriPathTemplate::new("/orders/{id}/items/{item}").unwrap();
        assert!(t.matches("/orders/42/items/7"));
        let vars = t.capture("/orders/42/items/7").unwrap();
        assert_eq!(
            vars,
            vec![
                ("id".to_string(), "42".to_string()),
                ("item".to_string(), "7".to_string())
            ]
        );
        assert!(t.capture("/orders/42").is_none());
    }

    #[test]
    fn test_invalid_templates() {
        assert!(UriPathTemplate::new("/a/{").is_err());
        assert!(UriPathTemplate::new("/a/{}").is_err());
        assert!(UriPathTemplate::new("/a/x{y}").is_err());
        assert!(UriPathTemplate::new("/a/{x{y}}").is_err());
    }

    #[test]
    fn test_trailing_slashes_ignored() {
        let t = UriPathTemplate::new("/a/{b}/").unwrap();
        assert!(t.matches("/a/1"));
        assert!(t.matches("a/1/"));
    }
}
