//! # Event Bus
//!
//! Synchronous publish/subscribe over named events.
//!
//! The bus keeps an ordered list of registrations `{name, callback, options,
//! paused}`. Binding never deduplicates: the same callback bound twice runs
//! twice per `fire`.
//!
//! ## Lookup Semantics
//!
//! `unbind`, `pause` and `unpause` locate registrations by name plus a subset
//! match on options (see [`Options::covers`]). `unbind` removes every match;
//! `pause`/`unpause` flip only the first match per name.
//!
//! ## Reentrancy
//!
//! The registration list is never borrowed while a callback runs. `fire`
//! snapshots the matching callbacks first, so a callback may bind, unbind or
//! fire on the same bus. Registrations added during a `fire` are not invoked
//! by that `fire`; registrations removed during it still are.
//!
//! ## Failure Model
//!
//! A callback returning `Err` aborts the remaining fan-out of that `fire`
//! call and the error is returned to the caller. There is no per-listener
//! isolation.

use crate::primitives::ONCE_ID_PREFIX;
use crate::types::{Names, Options, StateError};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// A bus callback. Receives the arguments passed to `fire`.
pub type Listener = Rc<dyn Fn(&[Value]) -> Result<(), StateError>>;

struct Registration {
    name: String,
    callback: Listener,
    options: Options,
    paused: bool,
}

thread_local! {
    static GLOBAL_BUS: Rc<EventBus> = Rc::new(EventBus::new());
}

/// The event bus.
#[derive(Default)]
pub struct EventBus {
    registrations: RefCell<Vec<Registration>>,
    next_once: Cell<u64>,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide default bus for the current thread.
    #[must_use]
    pub fn global() -> Rc<Self> {
        GLOBAL_BUS.with(Rc::clone)
    }

    /// Bind a callback with empty options.
    pub fn bind<F>(&self, names: impl Into<Names>, callback: F)
    where
        F: Fn(&[Value]) -> Result<(), StateError> + 'static,
    {
        self.bind_listener(names, Options::new(), false, Rc::new(callback));
    }

    /// Bind a callback with options and an initial paused state.
    pub fn bind_with<F>(
        &self,
        names: impl Into<Names>,
        options: impl Into<Options>,
        paused: bool,
        callback: F,
    ) where
        F: Fn(&[Value]) -> Result<(), StateError> + 'static,
    {
        self.bind_listener(names, options, paused, Rc::new(callback));
    }

    /// Bind an already shared listener to every name in `names`.
    pub fn bind_listener(
        &self,
        names: impl Into<Names>,
        options: impl Into<Options>,
        paused: bool,
        listener: Listener,
    ) {
        let names = names.into();
        let options = options.into();
        let mut regs = self.registrations.borrow_mut();
        for name in names.iter() {
            tracing::trace!(event = name, paused, "bind");
            regs.push(Registration {
                name: name.to_string(),
                callback: Rc::clone(&listener),
                options: options.clone(),
                paused,
            });
        }
    }

    /// Remove every registration matching `{name, options}`.
    ///
    /// Returns the number removed. Unknown names are a silent no-op.
    pub fn unbind(&self, names: impl Into<Names>, options: impl Into<Options>) -> usize {
        let names = names.into();
        let query = options.into();
        let mut regs = self.registrations.borrow_mut();
        let before = regs.len();
        for name in names.iter() {
            regs.retain(|r| !(r.name == name && r.options.covers(&query)));
        }
        let removed = before - regs.len();
        tracing::trace!(removed, "unbind");
        removed
    }

    /// Invoke every non-paused callback bound to `name`, in registration order.
    ///
    /// Returns the number of callbacks invoked. Firing a name with no
    /// registrations is a no-op.
    pub fn fire(&self, name: &str, args: &[Value]) -> Result<usize, StateError> {
        let snapshot: Vec<Listener> = self
            .registrations
            .borrow()
            .iter()
            .filter(|r| r.name == name && !r.paused)
            .map(|r| Rc::clone(&r.callback))
            .collect();

        tracing::trace!(event = name, listeners = snapshot.len(), "fire");

        for callback in &snapshot {
            callback(args).inspect_err(|e| {
                tracing::debug!(event = name, error = %e, "listener failed, fan-out aborted");
            })?;
        }
        Ok(snapshot.len())
    }

    /// Pause the first registration matching `{name, options}` for each name.
    ///
    /// Returns the number of registrations flipped.
    pub fn pause(&self, names: impl Into<Names>, options: impl Into<Options>) -> usize {
        self.set_paused(&names.into(), &options.into(), true)
    }

    /// Resume the first registration matching `{name, options}` for each name.
    pub fn unpause(&self, names: impl Into<Names>, options: impl Into<Options>) -> usize {
        self.set_paused(&names.into(), &options.into(), false)
    }

    fn set_paused(&self, names: &Names, query: &Options, paused: bool) -> usize {
        let mut regs = self.registrations.borrow_mut();
        let mut flipped = 0;
        for name in names.iter() {
            if let Some(reg) = regs
                .iter_mut()
                .find(|r| r.name == name && r.options.covers(query))
            {
                reg.paused = paused;
                flipped += 1;
            }
        }
        flipped
    }

    /// Bind a callback that runs at most once, then unbinds itself.
    ///
    /// The registration is tagged with a generated id, returned so callers
    /// can cancel it early with `unbind(name, id)`. The at-most-once guarantee
    /// holds even if the event is re-fired from inside the callback.
    pub fn once<F>(self: &Rc<Self>, names: impl Into<Names>, callback: F) -> Options
    where
        F: Fn(&[Value]) -> Result<(), StateError> + 'static,
    {
        let names = names.into();
        let id = self.next_once.get();
        self.next_once.set(id.wrapping_add(1));
        let options = Options::id(format!("{}{}", ONCE_ID_PREFIX, id));

        let bus = Rc::downgrade(self);
        let fired = Cell::new(false);
        let own_names = names.clone();
        let own_options = options.clone();
        self.bind_with(names, options.clone(), false, move |args| {
            if fired.replace(true) {
                return Ok(());
            }
            let result = callback(args);
            if let Some(bus) = bus.upgrade() {
                bus.unbind(own_names.clone(), &own_options);
            }
            result
        });
        options
    }

    /// Number of registrations bound to `name`, paused or not.
    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        self.registrations
            .borrow()
            .iter()
            .filter(|r| r.name == name)
            .count()
    }

    /// Check if `name` has a registration that is currently paused.
    #[must_use]
    pub fn is_paused(&self, name: &str, options: impl Into<Options>) -> bool {
        let query = options.into();
        self.registrations
            .borrow()
            .iter()
            .any(|r| r.name == name && r.options.covers(&query) && r.paused)
    }

    /// Total number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.borrow().len()
    }

    /// Check if the bus has no registrations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.borrow().is_empty()
    }

    /// Remove every registration.
    pub fn clear(&self) {
        self.registrations.borrow_mut().clear();
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let regs = self.registrations.borrow();
        let names: Vec<&str> = regs.iter().map(|r| r.name.as_str()).collect();
        f.debug_struct("EventBus")
            .field("registrations", &names)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
