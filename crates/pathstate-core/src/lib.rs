//! # pathstate-core
//!
//! A path-addressed reactive state core.
//!
//! Application state lives in one nested JSON tree addressed by dotted key
//! paths (`"cart.items.0.qty"`). Writes go through a gate that suppresses
//! no-op updates and announces real ones on a named-event bus as
//! `store:<key>`. A thin delegation layer binds element events so that every
//! native listener it adds can be removed again by `{element, event,
//! selector, options}`.
//!
//! ## Layers
//!
//! - `path` / `compare` / `collection`: pure functions over `serde_json::Value`
//! - `bus`: named events, fan-out in registration order
//! - `store`: the single state tree plus change notifications
//! - `dom` / `delegate`: in-memory element tree and the listener registry
//!
//! ## Threading
//!
//! Registries are single-threaded (`Rc` + `RefCell`). Each thread gets its own
//! process-wide default via `EventBus::global()`, `Store::global()` and
//! `Delegation::global()`.

// =============================================================================
// MODULES
// =============================================================================

pub mod bus;
pub mod collection;
pub mod compare;
pub mod delegate;
pub mod dom;
pub mod path;
pub mod primitives;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Key, Names, Options, Payload, StateError};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use bus::{EventBus, Listener};
pub use collection::Filter;
pub use compare::{includes, matches};
pub use delegate::Delegation;
pub use dom::{DomEvent, Element, NativeListener, Rect, Selector, WeakElement};
pub use path::PathResolver;
pub use store::Store;

// =============================================================================
// RE-EXPORTS: Values
// =============================================================================

pub use serde_json::{Value, json};
