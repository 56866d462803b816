//! # State Store
//!
//! A single nested JSON object addressed by key paths, cloned on read and
//! notifying on write.
//!
//! ## Guarantees
//!
//! - `get` always returns an owned deep clone: callers cannot reach store
//!   internals through a returned value.
//! - `set` writes and fires `store:<key>` with `(value, key)` only when the
//!   new value is not cheaply equal to the stored one:
//!   - scalars compare by value (`1 == 1.0`, `null == null`)
//!   - containers compare by identity: re-setting the same `Rc<Value>` handle
//!     at the same key is a no-op, while a fresh container of the same shape
//!     is a change
//! - `unset` removes silently; it does not notify.
//!
//! Consistency is per key only. There is no multi-key transaction.
//!
//! ## Identity Tracking
//!
//! The store remembers which shared handle was last written at each key. Any
//! write or unset on the same branch (the key itself, an ancestor or a
//! descendant) forgets that handle, since the stored content no longer equals
//! what the handle points to.

use crate::bus::EventBus;
use crate::collection::{self, Filter};
use crate::compare::{equal, scalar_eq};
use crate::path::PathResolver;
use crate::primitives::{APPEND_SUFFIX, ID_OPTION, store_event};
use crate::types::{Key, Options, Payload, StateError};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

thread_local! {
    static GLOBAL_STORE: Rc<Store> = Rc::new(Store::with_bus(EventBus::global()));
}

/// The state store.
pub struct Store {
    root: RefCell<Value>,
    identities: RefCell<Vec<(Vec<String>, Rc<Value>)>>,
    bus: Rc<EventBus>,
    resolver: PathResolver,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create an empty store with its own private bus.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bus(Rc::new(EventBus::new()))
    }

    /// Create an empty store notifying on the given bus.
    #[must_use]
    pub fn with_bus(bus: Rc<EventBus>) -> Self {
        Self {
            root: RefCell::new(Value::Object(Map::new())),
            identities: RefCell::new(Vec::new()),
            bus,
            resolver: PathResolver::new(),
        }
    }

    /// Create a store seeded with initial data.
    ///
    /// Non-object seeds are ignored; the root is always an object.
    #[must_use]
    pub fn with_data(bus: Rc<EventBus>, data: Value) -> Self {
        let store = Self::with_bus(bus);
        if data.is_object() {
            *store.root.borrow_mut() = data;
        }
        store
    }

    /// The process-wide default store for the current thread.
    ///
    /// It notifies on [`EventBus::global`].
    #[must_use]
    pub fn global() -> Rc<Self> {
        GLOBAL_STORE.with(Rc::clone)
    }

    /// The bus this store notifies on.
    #[must_use]
    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Check whether a value is stored at the key. A stored `null` counts.
    #[must_use]
    pub fn has(&self, key: impl Into<Key>) -> bool {
        self.resolver.has(&self.root.borrow(), &key.into())
    }

    /// Deep clone of the value at the key.
    #[must_use]
    pub fn get(&self, key: impl Into<Key>) -> Option<Value> {
        self.resolver.get(&self.root.borrow(), &key.into()).cloned()
    }

    /// Deep clone of the value at the key, or the fallback.
    #[must_use]
    pub fn get_or(&self, key: impl Into<Key>, fallback: Value) -> Value {
        self.resolver
            .get_or(&self.root.borrow(), &key.into(), fallback)
    }

    /// Read the key, first materializing the fallback if it is absent.
    ///
    /// The materializing write goes through `set`, so it notifies.
    pub fn get_or_insert(&self, key: impl Into<Key>, fallback: Value) -> Result<Value, StateError> {
        let key = key.into();
        if !self.has(&key) {
            self.set(&key, fallback.clone())?;
        }
        Ok(self.get_or(&key, fallback))
    }

    /// Deep clone of the whole root object.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        self.root.borrow().clone()
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    /// Write a value and notify `store:<key>` if it changed.
    ///
    /// Returns `Ok(false)` when the write was suppressed as unchanged or the
    /// key addresses nothing (empty, or a non-slot segment on an array); no
    /// notification fires then. A listener failure is returned after the
    /// write has been applied.
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Payload>) -> Result<bool, StateError> {
        let key = key.into();
        let payload = value.into();
        let segs = self.resolver.keyoptim(&key);
        let name = key.display_name();

        if segs.is_empty() {
            return Ok(false);
        }
        if self.is_unchanged(&key, &segs, &payload) {
            tracing::trace!(key = %name, "set suppressed: value unchanged");
            return Ok(false);
        }

        let value = payload.value().clone();
        let written = self
            .resolver
            .assign(&mut self.root.borrow_mut(), &key, value.clone());
        if !written {
            tracing::debug!(key = %name, "set dropped: path does not address a slot");
            return Ok(false);
        }
        self.forget_branch(&segs);
        if let Payload::Shared(rc) = &payload
            && payload.is_container()
            && !segs.iter().any(|s| s.ends_with(APPEND_SUFFIX))
        {
            self.identities.borrow_mut().push((segs, Rc::clone(rc)));
        }

        tracing::debug!(key = %name, "store write");
        self.bus
            .fire(&store_event(&name), &[value, Value::String(name.clone())])?;
        Ok(true)
    }

    /// Delete the value at the key without notifying.
    ///
    /// Returns whether a value was present.
    pub fn unset(&self, key: impl Into<Key>) -> bool {
        let key = key.into();
        let existed = self.has(&key);
        {
            let mut root = self.root.borrow_mut();
            self.resolver.unset(&mut root, &key);
        }
        self.forget_branch(&self.resolver.keyoptim(&key));
        existed
    }

    fn is_unchanged(&self, key: &Key, segs: &[String], payload: &Payload) -> bool {
        match payload {
            Payload::Shared(rc) if payload.is_container() => self
                .identities
                .borrow()
                .iter()
                .any(|(k, held)| k.as_slice() == segs && Rc::ptr_eq(held, rc)),
            _ => self
                .resolver
                .get(&self.root.borrow(), key)
                .is_some_and(|current| scalar_eq(current, payload.value())),
        }
    }

    fn forget_branch(&self, segs: &[String]) {
        if segs.is_empty() {
            return;
        }
        self.identities.borrow_mut().retain(|(k, _)| {
            let shared = k.len().min(segs.len());
            k[..shared] != segs[..shared]
        });
    }

    // =========================================================================
    // ARRAY CONVENIENCE
    // =========================================================================

    /// Find an element of the array at `key` by `id`.
    ///
    /// `probe` is either an object carrying `id` or the bare id value.
    #[must_use]
    pub fn find(&self, key: impl Into<Key>, probe: &Value) -> Option<Value> {
        let root = self.root.borrow();
        let items = self.resolver.get(&root, &key.into())?.as_array()?;
        let id = probe_id(probe);
        collection::find(items, &by_id(id)).cloned()
    }

    /// Find an element by `id`, or return the fallback.
    #[must_use]
    pub fn find_or(&self, key: impl Into<Key>, probe: &Value, fallback: Value) -> Value {
        self.find(key, probe).unwrap_or(fallback)
    }

    /// Replace the element of the array at `key` whose `id` equals `value.id`.
    ///
    /// The write goes through `set` on the indexed sub-path, so it notifies
    /// `store:<key>.<index>`. Returns `Ok(false)` if no element matched.
    pub fn replace(&self, key: impl Into<Key>, value: Value) -> Result<bool, StateError> {
        let key = key.into();
        let index = {
            let root = self.root.borrow();
            match self.resolver.get(&root, &key) {
                None => return Ok(false),
                Some(Value::Array(items)) => {
                    collection::find_index(items, &by_id(probe_id(&value)))
                }
                Some(_) => {
                    return Err(StateError::NotAnArray {
                        key: key.display_name(),
                    });
                }
            }
        };
        let Some(index) = index else {
            return Ok(false);
        };
        let mut segs = self.resolver.keyoptim(&key);
        segs.push(index.to_string());
        self.set(Key::Segments(segs), value)
    }

    /// Append each item not already present (structural match) to the array
    /// at `key`. An absent key starts as an empty array.
    pub fn add(&self, key: impl Into<Key>, items: &[Value]) -> Result<bool, StateError> {
        let key = key.into();
        let current = self.array_at(&key)?;
        let merged = collection::union(&current, items);
        if merged.len() == current.len() {
            return Ok(false);
        }
        self.set(key, Value::Array(merged))
    }

    /// Remove every element structurally matching one of `items` from the
    /// array at `key`.
    pub fn remove(&self, key: impl Into<Key>, items: &[Value]) -> Result<bool, StateError> {
        let key = key.into();
        let current = self.array_at(&key)?;
        let kept = collection::diff(&current, items);
        if kept.len() == current.len() {
            return Ok(false);
        }
        self.set(key, Value::Array(kept))
    }

    fn array_at(&self, key: &Key) -> Result<Vec<Value>, StateError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(StateError::NotAnArray {
                key: key.display_name(),
            }),
        }
    }

    // =========================================================================
    // SUBSCRIPTIONS
    // =========================================================================

    /// Subscribe to writes at `key`.
    pub fn watch<F>(&self, key: impl Into<Key>, callback: F)
    where
        F: Fn(&[Value]) -> Result<(), StateError> + 'static,
    {
        self.watch_with(key, Options::new(), callback);
    }

    /// Subscribe to writes at `key` with registration options.
    pub fn watch_with<F>(&self, key: impl Into<Key>, options: impl Into<Options>, callback: F)
    where
        F: Fn(&[Value]) -> Result<(), StateError> + 'static,
    {
        let name = store_event(&key.into().display_name());
        self.bus.bind_with(name, options, false, callback);
    }

    /// Remove subscriptions at `key` matching the options.
    pub fn unwatch(&self, key: impl Into<Key>, options: impl Into<Options>) -> usize {
        let name = store_event(&key.into().display_name());
        self.bus.unbind(name, options)
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("root", &self.root.borrow())
            .field("tracked_handles", &self.identities.borrow().len())
            .finish()
    }
}

fn probe_id(probe: &Value) -> &Value {
    match probe {
        Value::Object(map) => map.get(ID_OPTION).unwrap_or(&Value::Null),
        other => other,
    }
}

fn by_id(id: &Value) -> Filter<'_> {
    Filter::predicate(move |item| item.get(ID_OPTION).is_some_and(|v| equal(v, id)))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn counting(store: &Store, key: &str) -> Rc<Cell<usize>> {
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        store.watch(key, move |_| {
            h.set(h.get() + 1);
            Ok(())
        });
        hits
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = Store::new();
        store.set("a.b", json!({"x": [1, 2]})).expect("set");
        assert_eq!(store.get("a.b"), Some(json!({"x": [1, 2]})));
        assert_eq!(store.get("a.b.x.1"), Some(json!(2)));
    }

    #[test]
    fn get_returns_detached_clone() {
        let store = Store::new();
        store.set("cfg", json!({"theme": "dark"})).expect("set");
        let mut copy = store.get("cfg").expect("present");
        copy["theme"] = json!("light");
        assert_eq!(store.get("cfg.theme"), Some(json!("dark")));
    }

    #[test]
    fn shared_handle_suppresses_repeat_writes() {
        let store = Store::new();
        let hits = counting(&store, "a.b");
        let shared = Rc::new(json!({"x": 1}));

        assert!(store.set("a.b", &shared).expect("set"));
        assert!(!store.set("a.b", &shared).expect("set"));
        assert_eq!(hits.get(), 1);

        // Same shape, new object: still a change.
        assert!(store.set("a.b", json!({"x": 1})).expect("set"));
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn descendant_write_forgets_handle() {
        let store = Store::new();
        let shared = Rc::new(json!({"x": 1}));
        store.set("a", &shared).expect("set");
        store.set("a.x", json!(2)).expect("set");
        assert!(store.set("a", &shared).expect("set"));
        assert_eq!(store.get("a.x"), Some(json!(1)));
    }

    #[test]
    fn empty_key_write_is_silent() {
        let store = Store::new();
        let hits = counting(&store, "");
        let root = Vec::<String>::new();
        assert!(!store.set(root.clone(), json!(1)).expect("set"));
        assert!(!store.set(root, &Rc::new(json!({"x": 1}))).expect("set"));
        assert_eq!(hits.get(), 0);
        assert_eq!(store.snapshot(), json!({}));
    }

    #[test]
    fn dropped_write_is_silent() {
        let store = Store::with_data(Rc::new(EventBus::new()), json!({"xs": [1]}));
        let hits = counting(&store, "xs.foo");
        assert!(!store.set("xs.foo", json!(2)).expect("set"));
        assert!(!store.set("xs.18446744073709551615", json!(2)).expect("set"));
        assert_eq!(hits.get(), 0);
        assert_eq!(store.snapshot(), json!({"xs": [1]}));

        // A dropped shared write must not be remembered either.
        let shared = Rc::new(json!({"y": 1}));
        assert!(!store.set("xs.bar", &shared).expect("set"));
        assert!(!store.set("xs.bar", &shared).expect("set"));
    }

    #[test]
    fn empty_key_unset_keeps_handles() {
        let store = Store::new();
        let hits = counting(&store, "a");
        let shared = Rc::new(json!({"x": 1}));
        assert!(store.set("a", &shared).expect("set"));
        assert!(!store.unset(Vec::<String>::new()));
        assert!(!store.set("a", &shared).expect("set"));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn scalar_writes_compare_by_value() {
        let store = Store::new();
        let hits = counting(&store, "n");
        assert!(store.set("n", json!(1)).expect("set"));
        assert!(!store.set("n", json!(1.0)).expect("set"));
        assert!(store.set("n", json!("1")).expect("set"));
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn notification_carries_value_and_key() {
        let store = Store::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.watch("user.name", move |args| {
            sink.borrow_mut().extend_from_slice(args);
            Ok(())
        });
        store.set("user.name", json!("ada")).expect("set");
        assert_eq!(*seen.borrow(), vec![json!("ada"), json!("user.name")]);
    }

    #[test]
    fn null_counts_as_present_until_unset() {
        let store = Store::new();
        store.set("a.b", Value::Null).expect("set");
        assert!(store.has("a.b"));
        assert!(store.unset("a.b"));
        assert!(!store.has("a.b"));
        assert!(!store.unset("a.b"));
    }

    #[test]
    fn unset_does_not_notify() {
        let store = Store::new();
        let hits = counting(&store, "k");
        store.set("k", json!(1)).expect("set");
        store.unset("k");
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn get_or_insert_materializes_fallback() {
        let store = Store::new();
        let hits = counting(&store, "prefs");
        let v = store.get_or_insert("prefs", json!({"lang": "en"})).expect("get");
        assert_eq!(v, json!({"lang": "en"}));
        assert!(store.has("prefs"));
        assert_eq!(hits.get(), 1);

        let again = store.get_or_insert("prefs", json!({})).expect("get");
        assert_eq!(again, json!({"lang": "en"}));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn append_key_pushes() {
        let store = Store::new();
        store.set("list[]", json!("x")).expect("set");
        store.set("list[]", json!("y")).expect("set");
        assert_eq!(store.get("list"), Some(json!(["x", "y"])));
    }

    #[test]
    fn add_and_remove_items() {
        let store = Store::new();
        assert!(store.add("tags", &[json!("a"), json!("b")]).expect("add"));
        assert!(!store.add("tags", &[json!("a")]).expect("add"));
        assert!(store.remove("tags", &[json!("a")]).expect("remove"));
        assert!(!store.remove("tags", &[json!("zzz")]).expect("remove"));
        assert_eq!(store.get("tags"), Some(json!(["b"])));
    }

    #[test]
    fn array_ops_reject_non_arrays() {
        let store = Store::new();
        store.set("n", json!(5)).expect("set");
        assert_eq!(
            store.add("n", &[json!(1)]),
            Err(StateError::NotAnArray { key: "n".to_string() })
        );
        assert!(store.replace("n", json!({"id": 1})).is_err());
    }

    #[test]
    fn find_and_replace_by_id() {
        let store = Store::new();
        for id in 1..=3 {
            store.set("cart.items[]", json!({"id": id})).expect("set");
        }
        assert_eq!(store.find("cart.items", &json!({"id": 2})), Some(json!({"id": 2})));
        assert_eq!(store.find("cart.items", &json!(3)), Some(json!({"id": 3})));
        assert_eq!(store.find_or("cart.items", &json!(9), json!(null)), Value::Null);

        assert!(store.replace("cart.items", json!({"id": 2, "qty": 5})).expect("replace"));
        assert_eq!(store.get("cart.items.1"), Some(json!({"id": 2, "qty": 5})));
        assert!(!store.replace("cart.items", json!({"id": 7})).expect("replace"));
    }

    #[test]
    fn listener_may_write_back_into_store() {
        let store = Rc::new(Store::new());
        let weak = Rc::downgrade(&store);
        store.watch("src", move |args| {
            if let Some(store) = weak.upgrade() {
                store.set("mirror", args[0].clone())?;
            }
            Ok(())
        });
        store.set("src", json!(42)).expect("set");
        assert_eq!(store.get("mirror"), Some(json!(42)));
    }

    #[test]
    fn unwatch_by_id() {
        let store = Store::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        store.watch_with("k", "view", move |_| {
            h.set(h.get() + 1);
            Ok(())
        });
        assert_eq!(store.unwatch("k", "view"), 1);
        store.set("k", json!(1)).expect("set");
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn seeded_store_reads_initial_data() {
        let store = Store::with_data(Rc::new(EventBus::new()), json!({"a": {"b": 1}}));
        assert_eq!(store.get("a.b"), Some(json!(1)));
        assert_eq!(store.snapshot(), json!({"a": {"b": 1}}));
    }
}
