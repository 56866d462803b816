//! # DOM Event Delegation
//!
//! A registry of native listeners bound through this layer, kept parallel to
//! the elements' own listener lists so that `unbind` can hand the element the
//! exact callback it registered.
//!
//! Each registry entry records `{el, event, callback, selector, paused,
//! options}`. Lookup follows the bus conventions: options match by subset
//! (`{id: X}` finds everything tagged `X`), an absent selector or an empty
//! event list matches any.
//!
//! ## Layered Semantics
//!
//! - `once`: tags the registration with a generated id; the wrapper runs the
//!   callback at most once, then unbinds itself by that id.
//! - `live`: one listener on a stable ancestor serves any descendant matching
//!   a selector, including ones added later. Drag/drop events resolve the
//!   element under the pointer instead of the event target.
//!
//! ## Retention
//!
//! Entries are never pruned when an element is detached from its tree. An
//! entry keeps its element alive until it is unbound; call
//! [`Delegation::unbind_all`] when discarding an element.

use crate::dom::{DomEvent, Element, NativeListener, Selector};
use crate::primitives::{CAPTURE_OPTION, ID_OPTION, ONCE_ID_PREFIX, is_drag_event};
use crate::types::{Options, StateError};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

struct DelegateEntry {
    el: Element,
    event: String,
    callback: NativeListener,
    selector: Option<String>,
    paused: Rc<Cell<bool>>,
    options: Options,
}

impl DelegateEntry {
    fn capture(&self) -> bool {
        self.options.flag(CAPTURE_OPTION)
    }

    fn matches(&self, el: &Element, events: &[&str], selector: Option<&str>, query: &Options) -> bool {
        self.el.ptr_eq(el)
            && (events.is_empty() || events.contains(&self.event.as_str()))
            && selector.is_none_or(|s| self.selector.as_deref() == Some(s))
            && self.options.covers(query)
    }
}

thread_local! {
    static GLOBAL_DELEGATION: Rc<Delegation> = Rc::new(Delegation::new());
}

/// The delegation registry.
#[derive(Default)]
pub struct Delegation {
    entries: RefCell<Vec<DelegateEntry>>,
    next_once: Cell<u64>,
}

impl Delegation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide default registry for the current thread.
    #[must_use]
    pub fn global() -> Rc<Self> {
        GLOBAL_DELEGATION.with(Rc::clone)
    }

    /// Bind a callback to one or more whitespace-separated event types.
    ///
    /// Returns the number of native listeners added.
    pub fn bind<F>(
        &self,
        el: &Element,
        events: &str,
        options: impl Into<Options>,
        callback: F,
    ) -> Result<usize, StateError>
    where
        F: Fn(&DomEvent) -> Result<(), StateError> + 'static,
    {
        self.register(el, events, None, false, options.into(), Rc::new(callback))
    }

    /// Bind with an explicit selector tag and initial paused state.
    ///
    /// The selector is recorded for lookup only; use [`Delegation::live`] to
    /// filter by it.
    pub fn bind_with<F>(
        &self,
        el: &Element,
        events: &str,
        selector: Option<&str>,
        pause: bool,
        options: impl Into<Options>,
        callback: F,
    ) -> Result<usize, StateError>
    where
        F: Fn(&DomEvent) -> Result<(), StateError> + 'static,
    {
        if let Some(s) = selector {
            Selector::parse(s)?;
        }
        self.register(el, events, selector, pause, options.into(), Rc::new(callback))
    }

    fn register(
        &self,
        el: &Element,
        events: &str,
        selector: Option<&str>,
        pause: bool,
        options: Options,
        callback: NativeListener,
    ) -> Result<usize, StateError> {
        let mut added = 0;
        for event in events.split_whitespace() {
            let paused = Rc::new(Cell::new(pause));
            let flag = Rc::clone(&paused);
            let inner = Rc::clone(&callback);
            let native: NativeListener = Rc::new(move |e: &DomEvent| {
                if flag.get() { Ok(()) } else { inner(e) }
            });

            el.add_event_listener(event, &native, options.flag(CAPTURE_OPTION));
            self.entries.borrow_mut().push(DelegateEntry {
                el: el.clone(),
                event: event.to_string(),
                callback: native,
                selector: selector.map(str::to_string),
                paused,
                options: options.clone(),
            });
            added += 1;
        }
        tracing::debug!(element = ?el, events, added, "delegate bind");
        Ok(added)
    }

    /// Remove every entry matching `{el, events, selector, options}`.
    ///
    /// An empty `events` string matches every event type and a `None`
    /// selector matches any selector. Returns the number of native listeners
    /// removed.
    pub fn unbind(
        &self,
        el: &Element,
        events: &str,
        selector: Option<&str>,
        options: impl Into<Options>,
    ) -> usize {
        let query = options.into();
        let events: Vec<&str> = events.split_whitespace().collect();
        let mut entries = self.entries.borrow_mut();

        let indices: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.matches(el, &events, selector, &query))
            .map(|(i, _)| i)
            .collect();

        // Reverse so earlier indices stay valid while removing.
        for &i in indices.iter().rev() {
            let entry = entries.remove(i);
            entry
                .el
                .remove_event_listener(&entry.event, &entry.callback, entry.capture());
        }

        tracing::debug!(element = ?el, removed = indices.len(), "delegate unbind");
        indices.len()
    }

    /// Release every entry bound on `el`.
    pub fn unbind_all(&self, el: &Element) -> usize {
        self.unbind(el, "", None, Options::new())
    }

    /// Pause the first matching entry per event type.
    pub fn pause(
        &self,
        el: &Element,
        events: &str,
        selector: Option<&str>,
        options: impl Into<Options>,
    ) -> usize {
        self.set_paused(el, events, selector, &options.into(), true)
    }

    /// Resume the first matching entry per event type.
    pub fn unpause(
        &self,
        el: &Element,
        events: &str,
        selector: Option<&str>,
        options: impl Into<Options>,
    ) -> usize {
        self.set_paused(el, events, selector, &options.into(), false)
    }

    fn set_paused(
        &self,
        el: &Element,
        events: &str,
        selector: Option<&str>,
        query: &Options,
        paused: bool,
    ) -> usize {
        let entries = self.entries.borrow();
        let mut flipped = 0;
        for event in events.split_whitespace() {
            if let Some(entry) = entries
                .iter()
                .find(|e| e.matches(el, &[event], selector, query))
            {
                entry.paused.set(paused);
                flipped += 1;
            }
        }
        flipped
    }

    /// Bind a callback that runs at most once, then unbinds itself.
    ///
    /// Returns the options (including the generated id) the registration was
    /// tagged with, so it can be cancelled early.
    pub fn once<F>(
        self: &Rc<Self>,
        el: &Element,
        events: &str,
        options: impl Into<Options>,
        callback: F,
    ) -> Result<Options, StateError>
    where
        F: Fn(&DomEvent) -> Result<(), StateError> + 'static,
    {
        let n = self.next_once.get();
        self.next_once.set(n.wrapping_add(1));
        let tag = format!("{}{}", ONCE_ID_PREFIX, n);
        let options = options.into().with(ID_OPTION, tag.clone());

        let registry = Rc::downgrade(self);
        let bound = el.downgrade();
        let fired = Cell::new(false);
        let wrapper = move |event: &DomEvent| {
            if fired.replace(true) {
                return Ok(());
            }
            let registry = registry.upgrade().ok_or(StateError::Detached)?;
            let result = callback(event);
            if let Some(el) = bound.upgrade() {
                registry.unbind(&el, "", None, Options::id(tag.clone()));
            }
            result
        };

        self.register(el, events, None, false, options.clone(), Rc::new(wrapper))?;
        Ok(options)
    }

    /// Delegate events on `el` to descendants matching `selector`.
    ///
    /// The callback receives the event and the matched element. It runs only
    /// when a match exists inside `el`.
    pub fn live<F>(
        &self,
        el: &Element,
        events: &str,
        selector: &str,
        options: impl Into<Options>,
        pause: bool,
        callback: F,
    ) -> Result<usize, StateError>
    where
        F: Fn(&DomEvent, &Element) -> Result<(), StateError> + 'static,
    {
        let parsed = Selector::parse(selector)?;
        let scope = el.downgrade();
        let native = move |event: &DomEvent| {
            let origin = resolve_origin(event);
            let Some(matched) = origin.closest(&parsed) else {
                return Ok(());
            };
            if !scope.upgrade().is_some_and(|s| s.contains(&matched)) {
                return Ok(());
            }
            callback(event, &matched)
        };
        self.register(
            el,
            events,
            Some(selector),
            pause,
            options.into(),
            Rc::new(native),
        )
    }

    /// Dispatch a synthetic event of the given type at `el`.
    pub fn trigger(&self, el: &Element, event: &str) -> Result<usize, StateError> {
        el.dispatch(&DomEvent::new(event, el))
    }

    /// Number of entries bound on `el`.
    #[must_use]
    pub fn count(&self, el: &Element) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.el.ptr_eq(el))
            .count()
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

/// The element an event should be matched from.
///
/// Drag/drop events with coordinates use the element under the pointer.
fn resolve_origin(event: &DomEvent) -> Element {
    if is_drag_event(event.kind())
        && let Some((x, y)) = event.point()
        && let Some(hit) = event.target().root().hit_test(x, y)
    {
        return hit;
    }
    event.target().clone()
}

impl fmt::Debug for Delegation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.borrow();
        let summary: Vec<String> = entries
            .iter()
            .map(|e| format!("{:?}:{}", e.el, e.event))
            .collect();
        f.debug_struct("Delegation")
            .field("entries", &summary)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
