//! # Structural Comparator
//!
//! Two deliberately asymmetric predicates over JSON-like values:
//!
//! - [`includes`]: is `search` a structural subset of `value`?
//! - [`matches`]: do both sides have the same shape and contents?
//!
//! Arrays are compared by membership, never by position. Numbers compare by
//! numeric value, so `1` and `1.0` are equal.
//!
//! ```
//! use pathstate_core::compare::{includes, matches};
//! use serde_json::json;
//!
//! let cart = json!({"a": 1, "b": [1, 2]});
//! assert!(includes(&cart, &json!({"b": [2]})));
//! assert!(!matches(&cart, &json!({"b": [2]})));
//! ```

use serde_json::{Number, Value};

/// Check whether `search` is a structural subset of `value`.
///
/// - Array search: every element of `search` is a member of `value`
///   (an empty search is vacuously included).
/// - Object search: every key of `search` is recursively included in the
///   corresponding entry of `value`.
/// - Anything else: plain equality.
#[must_use]
pub fn includes(value: &Value, search: &Value) -> bool {
    includes_opt(Some(value), search)
}

/// Check whether `value` and `search` match exactly.
///
/// - Arrays: equal length and every distinct element of `search` is present
///   in `value`, in any order.
/// - Objects: every key from either side matches on both sides; a key missing
///   on one side only never matches.
/// - Anything else: plain equality.
#[must_use]
pub fn matches(value: &Value, search: &Value) -> bool {
    matches_opt(Some(value), Some(search))
}

/// Deep equality with numeric normalization.
///
/// Arrays compare positionally here; this is the membership test used by
/// both predicates.
#[must_use]
pub fn equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => number_eq(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| equal(x, y)))
        }
        _ => a == b,
    }
}

/// Cheap equality used to gate store writes.
///
/// Scalars compare by value; containers never compare equal here because
/// their identity is tracked by the store, not by content.
#[must_use]
pub fn scalar_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(_) | Value::Array(_), _) | (_, Value::Object(_) | Value::Array(_)) => {
            false
        }
        _ => equal(a, b),
    }
}

fn number_eq(x: &Number, y: &Number) -> bool {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn contains(items: &[Value], needle: &Value) -> bool {
    items.iter().any(|item| equal(item, needle))
}

fn includes_opt(value: Option<&Value>, search: &Value) -> bool {
    match search {
        Value::Array(wanted) => wanted.iter().all(|w| {
            value
                .and_then(Value::as_array)
                .is_some_and(|have| contains(have, w))
        }),
        Value::Object(wanted) => wanted.iter().all(|(k, w)| {
            let entry = value.and_then(Value::as_object).and_then(|m| m.get(k));
            includes_opt(entry, w)
        }),
        scalar => value.is_some_and(|v| equal(v, scalar)),
    }
}

fn matches_opt(value: Option<&Value>, search: Option<&Value>) -> bool {
    match (value, search) {
        (None, None) => true,
        (Some(Value::Array(have)), Some(Value::Array(wanted))) => {
            if have.len() != wanted.len() {
                return false;
            }
            let mut distinct: Vec<&Value> = Vec::with_capacity(wanted.len());
            for w in wanted {
                if !distinct.iter().any(|d| equal(d, w)) {
                    distinct.push(w);
                }
            }
            distinct.into_iter().all(|w| contains(have, w))
        }
        (Some(Value::Object(have)), Some(Value::Object(wanted))) => have
            .keys()
            .chain(wanted.keys())
            .all(|k| matches_opt(have.get(k), wanted.get(k))),
        (Some(Value::Array(_) | Value::Object(_)), Some(_))
        | (Some(_), Some(Value::Array(_) | Value::Object(_))) => false,
        (Some(v), Some(s)) => equal(v, s),
        _ => false,
    }
}

// =============================================================================
// TESTS
// =============================================================================
