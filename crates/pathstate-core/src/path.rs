//! # Path Resolver
//!
//! Nested reads and writes addressed by key paths.
//!
//! A key is a dotted string (`"cart.items.0"`) or a segment list
//! (`["cart", "items", "0"]`). Resolution is idempotent: the same string always
//! yields the same segments.
//!
//! ## Write Semantics
//!
//! - Missing or non-container intermediates are replaced by empty objects.
//! - A segment ending in `[]` creates (or reuses) an array under the bare name
//!   and addresses a fresh slot at its current length, so `set("list[]", x)`
//!   appends `x`.
//! - Array slots past the end are padded with `null`.
//!
//! ## Read Semantics
//!
//! Reads never panic and never allocate. A `null` or missing intermediate ends
//! the walk; a stored `null` at the final position still counts as present.

use crate::primitives::{APPEND_SUFFIX, MAX_ARRAY_PADDING, PATH_SEPARATOR};
use crate::types::Key;
use serde_json::{Map, Value};

// =============================================================================
// RESOLVER
// =============================================================================

/// Key-path resolver.
///
/// With `flatten` set, segment lists are joined and re-split so mixed inputs
/// such as `["a.b", "c"]` address the same location as `"a.b.c"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathResolver {
    flatten: bool,
}

impl PathResolver {
    /// Resolver that passes segment lists through unchanged.
    #[must_use]
    pub const fn new() -> Self {
        Self { flatten: false }
    }

    /// Resolver that re-splits dotted segments inside segment lists.
    #[must_use]
    pub const fn flattening() -> Self {
        Self { flatten: true }
    }

    /// Normalize a key into its ordered segment list.
    #[must_use]
    pub fn keyoptim(&self, keys: &Key) -> Vec<String> {
        match keys {
            Key::Path(p) => split(p),
            Key::Segments(segs) if self.flatten => split(&segs.join(".")),
            Key::Segments(segs) => segs.clone(),
        }
    }

    /// Check whether a value exists at the path.
    ///
    /// Only absence counts as missing: a stored `null` is present.
    #[must_use]
    pub fn has(&self, target: &Value, keys: &Key) -> bool {
        // Fast path: a single plain key on an object.
        if let (Key::Path(p), Value::Object(map)) = (keys, target)
            && !p.contains(PATH_SEPARATOR)
            && map.contains_key(p.as_str())
        {
            return true;
        }

        let segs = self.keyoptim(keys);
        let Some((last, parents)) = segs.split_last() else {
            return false;
        };
        walk(target, parents).is_some_and(|parent| child(parent, last).is_some())
    }

    /// Borrow the value at the path.
    ///
    /// Returns `None` when the path is empty or any intermediate is missing or
    /// `null`.
    #[must_use]
    pub fn get<'a>(&self, target: &'a Value, keys: &Key) -> Option<&'a Value> {
        let segs = self.keyoptim(keys);
        let (last, parents) = segs.split_last()?;
        walk(target, parents).and_then(|parent| child(parent, last))
    }

    /// Clone the value at the path, or return the fallback.
    #[must_use]
    pub fn get_or(&self, target: &Value, keys: &Key, fallback: Value) -> Value {
        self.get(target, keys).cloned().unwrap_or(fallback)
    }

    /// Write a value at the path, autovivifying intermediates.
    ///
    /// A `null` or scalar target is left untouched.
    pub fn set<'a>(&self, target: &'a mut Value, keys: &Key, value: Value) -> &'a mut Value {
        self.assign(target, keys, value);
        target
    }

    /// Write a value at the path and report whether it was stored.
    ///
    /// Returns `false` for an empty key, a scalar target, or a segment that
    /// addresses no slot (non-numeric on an array, or an index past the
    /// padding limit).
    pub fn assign(&self, target: &mut Value, keys: &Key, value: Value) -> bool {
        let segs = self.keyoptim(keys);
        !segs.is_empty() && is_container(target) && write(target, segs, value)
    }

    /// Delete the value at the path.
    ///
    /// No-op when the parent does not resolve. Array slots are removed, not
    /// nulled, so later elements shift down.
    pub fn unset<'a>(&self, target: &'a mut Value, keys: &Key) -> &'a mut Value {
        let segs = self.keyoptim(keys);
        if let Some((last, parents)) = segs.split_last()
            && let Some(parent) = walk_mut(target, parents)
        {
            remove(parent, last);
        }
        target
    }
}

// =============================================================================
// FREE FUNCTIONS (non-flattening resolver)
// =============================================================================

/// Normalize a key into segments.
pub fn keyoptim(keys: impl Into<Key>) -> Vec<String> {
    PathResolver::new().keyoptim(&keys.into())
}

/// Check whether a value exists at the path.
pub fn has(target: &Value, keys: impl Into<Key>) -> bool {
    PathResolver::new().has(target, &keys.into())
}

/// Borrow the value at the path.
pub fn get(target: &Value, keys: impl Into<Key>) -> Option<&Value> {
    PathResolver::new().get(target, &keys.into())
}

/// Clone the value at the path, or return the fallback.
pub fn get_or(target: &Value, keys: impl Into<Key>, fallback: Value) -> Value {
    PathResolver::new().get_or(target, &keys.into(), fallback)
}

/// Write a value at the path.
pub fn set(target: &mut Value, keys: impl Into<Key>, value: Value) -> &mut Value {
    PathResolver::new().set(target, &keys.into(), value)
}

/// Delete the value at the path.
pub fn unset(target: &mut Value, keys: impl Into<Key>) -> &mut Value {
    PathResolver::new().unset(target, &keys.into())
}

// =============================================================================
// TRAVERSAL HELPERS
// =============================================================================

fn split(path: &str) -> Vec<String> {
    path.split(PATH_SEPARATOR).map(str::to_string).collect()
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn index(seg: &str) -> Option<usize> {
    seg.parse::<usize>().ok()
}

fn child<'a>(node: &'a Value, seg: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(seg),
        Value::Array(items) => index(seg).and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_mut<'a>(node: &'a mut Value, seg: &str) -> Option<&'a mut Value> {
    match node {
        Value::Object(map) => map.get_mut(seg),
        Value::Array(items) => index(seg).and_then(|i| items.get_mut(i)),
        _ => None,
    }
}

/// Walk to the node addressed by `segs`, stopping at `null`.
fn walk<'a>(target: &'a Value, segs: &[String]) -> Option<&'a Value> {
    let mut node = target;
    for seg in segs {
        if node.is_null() {
            return None;
        }
        node = child(node, seg)?;
    }
    (!node.is_null()).then_some(node)
}

fn walk_mut<'a>(target: &'a mut Value, segs: &[String]) -> Option<&'a mut Value> {
    let mut node = target;
    for seg in segs {
        node = child_mut(node, seg)?;
    }
    (!node.is_null()).then_some(node)
}

/// Get or create the slot for `seg` inside a container.
fn slot_mut<'a>(node: &'a mut Value, seg: &str) -> Option<&'a mut Value> {
    match node {
        Value::Object(map) => Some(map.entry(seg.to_string()).or_insert(Value::Null)),
        Value::Array(items) => {
            let i = index(seg)?;
            if i >= items.len() {
                if i - items.len() > MAX_ARRAY_PADDING {
                    return None;
                }
                items.resize(i.checked_add(1)?, Value::Null);
            }
            items.get_mut(i)
        }
        _ => None,
    }
}

fn write(root: &mut Value, mut segs: Vec<String>, value: Value) -> bool {
    let mut node = root;
    let mut i = 0;

    while i < segs.len() {
        let seg = segs[i].clone();

        if let Some(name) = seg.strip_suffix(APPEND_SUFFIX) {
            let Some(slot) = slot_mut(node, name) else {
                tracing::debug!(segment = %seg, "path write skipped: segment does not address a slot");
                return false;
            };
            if !slot.is_array() {
                *slot = Value::Array(Vec::new());
            }
            let len = slot.as_array().map_or(0, Vec::len);
            segs.insert(i + 1, len.to_string());
            node = slot;
            i += 1;
            continue;
        }

        let Some(slot) = slot_mut(node, &seg) else {
            tracing::debug!(segment = %seg, "path write skipped: segment does not address a slot");
            return false;
        };

        if i + 1 == segs.len() {
            *slot = value;
            return true;
        }

        if !is_container(slot) {
            *slot = Value::Object(Map::new());
        }
        node = slot;
        i += 1;
    }
    false
}

fn remove(parent: &mut Value, seg: &str) {
    match parent {
        Value::Object(map) => {
            map.shift_remove(seg);
        }
        Value::Array(items) => {
            if let Some(i) = index(seg).filter(|i| *i < items.len()) {
                items.remove(i);
            }
        }
        _ => {}
    }
}

// =============================================================================
// TESTS
// =============================================================================
