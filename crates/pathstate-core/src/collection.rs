//! # Collection Helpers
//!
//! Query-by-example filtering and set-like array operations.
//!
//! A filter argument is resolved once into a [`Filter`]:
//! - `Predicate`: an arbitrary closure
//! - `Query`: an object or array, matched with [`includes`]
//! - `Literal`: any scalar, matched by equality

use crate::compare::{equal, includes, matches};
use serde_json::Value;
use std::fmt;

/// A resolved filter.
pub enum Filter<'a> {
    Predicate(Box<dyn Fn(&Value) -> bool + 'a>),
    Query(Value),
    Literal(Value),
}

impl<'a> Filter<'a> {
    /// Build a predicate filter.
    pub fn predicate(f: impl Fn(&Value) -> bool + 'a) -> Self {
        Self::Predicate(Box::new(f))
    }

    /// Test a single element.
    #[must_use]
    pub fn test(&self, item: &Value) -> bool {
        match self {
            Self::Predicate(f) => f(item),
            Self::Query(q) => includes(item, q),
            Self::Literal(v) => equal(item, v),
        }
    }
}

impl From<Value> for Filter<'_> {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(_) | Value::Array(_) => Self::Query(value),
            other => Self::Literal(other),
        }
    }
}

impl From<&Value> for Filter<'_> {
    fn from(value: &Value) -> Self {
        Self::from(value.clone())
    }
}

impl fmt::Debug for Filter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predicate(_) => f.write_str("Predicate(..)"),
            Self::Query(q) => f.debug_tuple("Query").field(q).finish(),
            Self::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
        }
    }
}

/// Clone every element accepted by the filter.
#[must_use]
pub fn filter(items: &[Value], by: &Filter<'_>) -> Vec<Value> {
    items.iter().filter(|i| by.test(i)).cloned().collect()
}

/// Index of the first element accepted by the filter.
#[must_use]
pub fn find_index(items: &[Value], by: &Filter<'_>) -> Option<usize> {
    items.iter().position(|i| by.test(i))
}

/// First element accepted by the filter.
#[must_use]
pub fn find<'v>(items: &'v [Value], by: &Filter<'_>) -> Option<&'v Value> {
    items.iter().find(|i| by.test(i))
}

/// Append every element of `extra` not already matched in `base`.
///
/// Duplicates within `extra` are collapsed as well.
#[must_use]
pub fn union(base: &[Value], extra: &[Value]) -> Vec<Value> {
    let mut out = base.to_vec();
    for item in extra {
        if !out.iter().any(|o| matches(o, item)) {
            out.push(item.clone());
        }
    }
    out
}

/// Drop every element of `base` matched by some element of `remove`.
#[must_use]
pub fn diff(base: &[Value], remove: &[Value]) -> Vec<Value> {
    base.iter()
        .filter(|b| !remove.iter().any(|r| matches(b, r)))
        .cloned()
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
