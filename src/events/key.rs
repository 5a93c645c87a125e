//! # Routing keys and type descriptors.
//!
//! A [`Key`] is what producers notify on and selectors match against. The
//! variant set is closed:
//!
//! - `Str` — free-form topic names (`"orders"`, `"/jobs/42"`)
//! - `Int` — numeric topics
//! - `Type` — an explicit [`TypeToken`] with a declared supertype lineage,
//!   so a consumer of `Animal` also sees `Dog` events
//! - `Token` — process-unique anonymous keys backing request/reply
//!
//! Keys are cheap to clone and hashable; the registry caches match results
//! per key.
//!
//! ## Example
//! ```rust
//! use keybus::{Key, TypeToken};
//!
//! let animal = TypeToken::root("Animal");
//! let dog = TypeToken::subtype("Dog", &animal);
//! assert!(dog.is_subtype_of(&animal));
//! assert!(!animal.is_subtype_of(&dog));
//!
//! let key: Key = "orders".into();
//! assert_eq!(key.to_string(), "orders");
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global sequence for anonymous token keys.
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(0);

/// Routing key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Free-form string topic.
    Str(Arc<str>),
    /// Numeric topic.
    Int(i64),
    /// Explicit type descriptor with supertype lineage.
    Type(TypeToken),
    /// Process-unique anonymous token.
    Token(u64),
}

impl Key {
    /// Allocates a fresh anonymous key, distinct from every other key in
    /// this process.
    pub fn anonymous() -> Self {
        Key::Token(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }

    /// The string form, for string keys only.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The type token, for type keys only.
    pub fn as_type(&self) -> Option<&TypeToken> {
        match self {
            Key::Type(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => f.write_str(s),
            Key::Int(n) => write!(f, "{n}"),
            Key::Type(t) => f.write_str(t.name()),
            Key::Token(n) => write!(f, "anonymous-{n}"),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(Arc::from(s))
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(Arc::from(s.as_str()))
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

impl From<TypeToken> for Key {
    fn from(t: TypeToken) -> Self {
        Key::Type(t)
    }
}

/// Named type descriptor with an explicit supertype lineage.
///
/// Identity is the name: two tokens with the same name are the same type,
/// whatever lineage each copy was built with.
#[derive(Clone, Debug)]
pub struct TypeToken {
    name: Arc<str>,
    /// Ancestor names, nearest first.
    lineage: Arc<[Arc<str>]>,
}

impl TypeToken {
    /// A type with no declared supertype.
    pub fn root(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            lineage: Vec::new().into(),
        }
    }

    /// A type whose direct supertype is `parent`.
    pub fn subtype(name: &str, parent: &TypeToken) -> Self {
        let mut lineage = Vec::with_capacity(parent.lineage.len() + 1);
        lineage.push(Arc::clone(&parent.name));
        lineage.extend(parent.lineage.iter().cloned());
        Self {
            name: Arc::from(name),
            lineage: lineage.into(),
        }
    }

    /// A root token named after the Rust type `T`.
    pub fn of<T: 'static>() -> Self {
        Self::root(std::any::type_name::<T>())
    }

    /// The type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if this type is `other` or declares it anywhere up the lineage.
    pub fn is_subtype_of(&self, other: &TypeToken) -> bool {
        self.name == other.name || self.lineage.iter().any(|a| *a == other.name)
    }
}

impl PartialEq for TypeToken {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TypeToken {}

impl Hash for TypeToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
