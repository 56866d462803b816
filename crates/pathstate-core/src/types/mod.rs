//! # Core Type Definitions
//!
//! This module contains the shared vocabulary of the state core:
//! - Key-path input (`Key`)
//! - Event name input (`Names`)
//! - Registration options (`Options`)
//! - Store write payloads (`Payload`)
//! - Error types (`StateError`)
//!
//! ## Value Model
//!
//! Every stored or transported value is a `serde_json::Value`. Object key
//! order is insertion order (`preserve_order`), so snapshots and clones are
//! stable.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::rc::Rc;
use thiserror::Error;

// =============================================================================
// KEY PATH INPUT
// =============================================================================

/// A key path as supplied by a caller.
///
/// Either a single string (dotted or not) or an ordered list of segments.
/// Numeric segments are coerced to their decimal string form on entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// A single string, split on `.` during resolution.
    Path(String),
    /// An explicit segment list.
    Segments(Vec<String>),
}

impl Key {
    /// Render the key the way it appears in notification names.
    ///
    /// Segment lists are joined with `.`.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::Path(p) => p.clone(),
            Self::Segments(s) => s.join("."),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self::Path(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self::Path(s)
    }
}

impl From<&String> for Key {
    fn from(s: &String) -> Self {
        Self::Path(s.clone())
    }
}

impl From<usize> for Key {
    fn from(n: usize) -> Self {
        Self::Path(n.to_string())
    }
}

impl From<Vec<String>> for Key {
    fn from(s: Vec<String>) -> Self {
        Self::Segments(s)
    }
}

impl From<Vec<&str>> for Key {
    fn from(s: Vec<&str>) -> Self {
        Self::Segments(s.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Key {
    fn from(s: &[&str]) -> Self {
        Self::Segments(s.iter().map(|p| (*p).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Key {
    fn from(s: [&str; N]) -> Self {
        Self::Segments(s.iter().map(|p| (*p).to_string()).collect())
    }
}

impl From<&Key> for Key {
    fn from(k: &Key) -> Self {
        k.clone()
    }
}

// =============================================================================
// EVENT NAMES
// =============================================================================

/// One event name or a list of names.
///
/// Bus operations given a list recurse per name, in list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Names {
    One(String),
    Many(Vec<String>),
}

impl Names {
    /// Iterate the names in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::One(n) => std::slice::from_ref(n),
            Self::Many(v) => v,
        };
        slice.iter().map(String::as_str)
    }
}

impl From<&str> for Names {
    fn from(s: &str) -> Self {
        Self::One(s.to_string())
    }
}

impl From<String> for Names {
    fn from(s: String) -> Self {
        Self::One(s)
    }
}

impl From<&String> for Names {
    fn from(s: &String) -> Self {
        Self::One(s.clone())
    }
}

impl From<Vec<String>> for Names {
    fn from(v: Vec<String>) -> Self {
        Self::Many(v)
    }
}

impl From<Vec<&str>> for Names {
    fn from(v: Vec<&str>) -> Self {
        Self::Many(v.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Names {
    fn from(v: [&str; N]) -> Self {
        Self::Many(v.iter().map(|n| (*n).to_string()).collect())
    }
}

// =============================================================================
// OPTIONS
// =============================================================================

/// Registration options, always an object.
///
/// `id` is the conventional discriminator for telling apart several
/// registrations on the same name. Primitive inputs are boxed into
/// `{"id": value}`; `null` becomes the empty object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct Options(Map<String, Value>);

impl Options {
    /// Empty options; matches every registration under subset lookup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options carrying only an `id`.
    #[must_use]
    pub fn id(id: impl Into<Value>) -> Self {
        let mut map = Map::new();
        map.insert("id".to_string(), id.into());
        Self(map)
    }

    /// Add or replace a key.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Get an option value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `id` discriminator, if any.
    #[must_use]
    pub fn id_value(&self) -> Option<&Value> {
        self.0.get("id")
    }

    /// Read a boolean flag, absent or non-boolean reads as `false`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Check if no option is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// View the options as a JSON object value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Check whether these (stored) options satisfy a lookup query.
    ///
    /// Subset semantics: every key in `query` must be structurally included
    /// here, so empty options match everything and `{id: X}` matches every
    /// registration tagged `X` regardless of its other options.
    #[must_use]
    pub fn covers(&self, query: &Options) -> bool {
        query.0.iter().all(|(k, q)| {
            self.0
                .get(k)
                .is_some_and(|stored| crate::compare::includes(stored, q))
        })
    }
}

impl From<Value> for Options {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            Value::Null => Self::default(),
            other => Self::id(other),
        }
    }
}

impl From<Options> for Value {
    fn from(options: Options) -> Self {
        Value::Object(options.0)
    }
}

impl From<&str> for Options {
    fn from(s: &str) -> Self {
        Self::id(s)
    }
}

impl From<String> for Options {
    fn from(s: String) -> Self {
        Self::id(s)
    }
}

impl From<i64> for Options {
    fn from(n: i64) -> Self {
        Self::id(n)
    }
}

impl From<()> for Options {
    fn from((): ()) -> Self {
        Self::default()
    }
}

impl From<&Options> for Options {
    fn from(o: &Options) -> Self {
        o.clone()
    }
}

// =============================================================================
// STORE PAYLOAD
// =============================================================================

/// A value handed to `Store::set`.
///
/// `Owned` values are always fresh: a container written this way counts as a
/// change even if an equal container is stored. `Shared` handles carry
/// identity: writing the same `Rc` twice to the same key is a no-op.
#[derive(Debug, Clone)]
pub enum Payload {
    Owned(Value),
    Shared(Rc<Value>),
}

impl Payload {
    /// Borrow the carried value.
    #[must_use]
    pub fn value(&self) -> &Value {
        match self {
            Self::Owned(v) => v,
            Self::Shared(rc) => rc,
        }
    }

    /// Check if the payload is an object or array.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self.value(), Value::Object(_) | Value::Array(_))
    }
}

impl From<Value> for Payload {
    fn from(v: Value) -> Self {
        Self::Owned(v)
    }
}

impl From<Rc<Value>> for Payload {
    fn from(rc: Rc<Value>) -> Self {
        Self::Shared(rc)
    }
}

impl From<&Rc<Value>> for Payload {
    fn from(rc: &Rc<Value>) -> Self {
        Self::Shared(Rc::clone(rc))
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the state core.
///
/// Absent paths, unknown registrations and double unbinds are not errors;
/// they resolve to fallbacks and silent no-ops.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    /// A listener failed; the remaining fan-out for that dispatch was skipped.
    #[error("Listener for '{event}' failed: {message}")]
    Listener { event: String, message: String },

    /// An array operation targeted a non-array value.
    #[error("Value at '{key}' is not an array")]
    NotAnArray { key: String },

    /// A delegation selector could not be parsed.
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// A self-unbinding wrapper outlived the registry that created it.
    #[error("Registry dropped before listener ran")]
    Detached,

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// A scenario step was malformed or failed an expectation.
    #[error("Scenario error: {0}")]
    Scenario(String),
}

impl StateError {
    /// Build a listener failure for the given event name.
    #[must_use]
    pub fn listener(event: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Listener {
            event: event.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
