//! # DOM Model
//!
//! A minimal in-memory element tree exposing the native event-target surface
//! the delegation layer consumes:
//!
//! - `add_event_listener` / `remove_event_listener`, deduplicated by
//!   `(event, callback identity, capture)` like a browser
//! - `dispatch` with capture, target and bubble phases and
//!   `stop_propagation`
//! - `closest` / `matches` against simple compound selectors
//! - `hit_test` against integer bounding rectangles
//!
//! Removal compares callbacks by `Rc` identity. A freshly built closure with
//! the same body never removes an existing listener.
//!
//! ## Selectors
//!
//! Compound selectors only: `tag`, `*`, `#id`, `.class`, `[attr]`,
//! `[attr=value]`, and comma-separated lists of those. Combinators
//! (descendant, `>`, `+`, `~`) are rejected.

use crate::types::StateError;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// A native listener callback.
pub type NativeListener = Rc<dyn Fn(&DomEvent) -> Result<(), StateError>>;

// =============================================================================
// GEOMETRY
// =============================================================================

/// An integer bounding rectangle in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open containment: the right and bottom edges are outside.
    #[must_use]
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x
            && py >= self.y
            && px < self.x.saturating_add(self.width)
            && py < self.y.saturating_add(self.height)
    }
}

// =============================================================================
// SELECTORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrTest {
    Present(String),
    Equals(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Compound>,
}

impl Selector {
    /// Parse a selector list.
    pub fn parse(source: &str) -> Result<Self, StateError> {
        let mut alternatives = Vec::new();
        for part in source.split(',') {
            alternatives.push(parse_compound(part.trim(), source)?);
        }
        Ok(Self {
            source: source.to_string(),
            alternatives,
        })
    }

    /// The selector text as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check whether an element matches any alternative.
    #[must_use]
    pub fn matches(&self, el: &Element) -> bool {
        self.alternatives.iter().any(|c| compound_matches(c, el))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(text: &str, source: &str) -> Result<Compound, StateError> {
    let invalid = || StateError::InvalidSelector(source.to_string());
    if text.is_empty() {
        return Err(invalid());
    }

    let chars: Vec<char> = text.chars().collect();
    let mut compound = Compound::default();
    let mut i = 0;

    let take_ident = |start: usize| -> (String, usize) {
        let mut end = start;
        while end < chars.len() && is_ident_char(chars[end]) {
            end += 1;
        }
        (chars[start..end].iter().collect(), end)
    };

    if chars[0] == '*' {
        i = 1;
    } else if is_ident_char(chars[0]) {
        let (tag, end) = take_ident(0);
        compound.tag = Some(tag.to_ascii_lowercase());
        i = end;
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                let (id, end) = take_ident(i + 1);
                if id.is_empty() {
                    return Err(invalid());
                }
                compound.id = Some(id);
                i = end;
            }
            '.' => {
                let (class, end) = take_ident(i + 1);
                if class.is_empty() {
                    return Err(invalid());
                }
                compound.classes.push(class);
                i = end;
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|c| *c == ']')
                    .map(|p| i + p)
                    .ok_or_else(invalid)?;
                let inner: String = chars[i + 1..close].iter().collect();
                let test = match inner.split_once('=') {
                    Some((name, value)) => {
                        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                        AttrTest::Equals(name.trim().to_string(), value.to_string())
                    }
                    None => AttrTest::Present(inner.trim().to_string()),
                };
                if matches!(&test, AttrTest::Present(n) | AttrTest::Equals(n, _) if n.is_empty()) {
                    return Err(invalid());
                }
                compound.attrs.push(test);
                i = close + 1;
            }
            _ => return Err(invalid()),
        }
    }

    Ok(compound)
}

fn compound_matches(c: &Compound, el: &Element) -> bool {
    let node = &el.0;
    if c.tag.as_deref().is_some_and(|t| t != node.tag) {
        return false;
    }
    if let Some(id) = &c.id {
        if node.id.borrow().as_deref() != Some(id.as_str()) {
            return false;
        }
    }
    let classes = node.classes.borrow();
    if !c.classes.iter().all(|want| classes.contains(want)) {
        return false;
    }
    let attrs = node.attributes.borrow();
    c.attrs.iter().all(|test| match test {
        AttrTest::Present(name) => attrs.contains_key(name),
        AttrTest::Equals(name, value) => attrs.get(name) == Some(value),
    })
}

// =============================================================================
// EVENTS
// =============================================================================

/// A dispatched native event.
pub struct DomEvent {
    kind: String,
    target: Element,
    current_target: RefCell<Option<Element>>,
    point: Option<(i32, i32)>,
    detail: Value,
    propagation_stopped: Cell<bool>,
}

impl DomEvent {
    /// Create an event of the given type aimed at `target`.
    #[must_use]
    pub fn new(kind: impl Into<String>, target: &Element) -> Self {
        Self {
            kind: kind.into(),
            target: target.clone(),
            current_target: RefCell::new(None),
            point: None,
            detail: Value::Null,
            propagation_stopped: Cell::new(false),
        }
    }

    /// Attach pointer coordinates.
    #[must_use]
    pub fn with_point(mut self, x: i32, y: i32) -> Self {
        self.point = Some((x, y));
        self
    }

    /// Attach a detail payload.
    #[must_use]
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = detail;
        self
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn target(&self) -> &Element {
        &self.target
    }

    /// The element whose listener is currently running.
    #[must_use]
    pub fn current_target(&self) -> Option<Element> {
        self.current_target.borrow().clone()
    }

    #[must_use]
    pub fn point(&self) -> Option<(i32, i32)> {
        self.point
    }

    #[must_use]
    pub fn detail(&self) -> &Value {
        &self.detail
    }

    /// Stop the event from reaching further elements.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    #[must_use]
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

impl fmt::Debug for DomEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomEvent")
            .field("kind", &self.kind)
            .field("target", &self.target)
            .field("point", &self.point)
            .finish()
    }
}

// =============================================================================
// ELEMENTS
// =============================================================================

struct NativeEntry {
    event: String,
    callback: NativeListener,
    capture: bool,
}

struct Node {
    tag: String,
    id: RefCell<Option<String>>,
    classes: RefCell<Vec<String>>,
    attributes: RefCell<BTreeMap<String, String>>,
    parent: RefCell<Weak<Node>>,
    children: RefCell<Vec<Element>>,
    listeners: RefCell<Vec<NativeEntry>>,
    rect: Cell<Option<Rect>>,
}

/// A handle to an element. Clones share the same element.
#[derive(Clone)]
pub struct Element(Rc<Node>);

/// A non-owning element handle, for callbacks stored on the element itself.
#[derive(Clone)]
pub struct WeakElement(Weak<Node>);

impl WeakElement {
    /// The element, if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Element> {
        self.0.upgrade().map(Element)
    }
}

impl Element {
    /// Create a detached element.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self(Rc::new(Node {
            tag: tag.to_ascii_lowercase(),
            id: RefCell::new(None),
            classes: RefCell::new(Vec::new()),
            attributes: RefCell::new(BTreeMap::new()),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            rect: Cell::new(None),
        }))
    }

    #[must_use]
    pub fn with_id(self, id: &str) -> Self {
        *self.0.id.borrow_mut() = Some(id.to_string());
        self
    }

    #[must_use]
    pub fn with_class(self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    #[must_use]
    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    #[must_use]
    pub fn with_rect(self, rect: Rect) -> Self {
        self.0.rect.set(Some(rect));
        self
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.0.tag
    }

    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.0.id.borrow().clone()
    }

    pub fn add_class(&self, class: &str) {
        let mut classes = self.0.classes.borrow_mut();
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.0.classes.borrow().iter().any(|c| c == class)
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.0
            .attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.attributes.borrow().get(name).cloned()
    }

    #[must_use]
    pub fn rect(&self) -> Option<Rect> {
        self.0.rect.get()
    }

    /// Check whether two handles refer to the same element.
    #[must_use]
    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// A handle that does not keep the element alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakElement {
        WeakElement(Rc::downgrade(&self.0))
    }

    // -------------------------------------------------------------------------
    // Tree
    // -------------------------------------------------------------------------

    /// Append a child, detaching it from any previous parent first.
    pub fn append_child(&self, child: &Element) {
        child.detach();
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.children.borrow_mut().push(child.clone());
    }

    /// Remove this element from its parent. Its listeners stay registered.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent
                .0
                .children
                .borrow_mut()
                .retain(|c| !c.ptr_eq(self));
        }
        *self.0.parent.borrow_mut() = Weak::new();
    }

    #[must_use]
    pub fn parent(&self) -> Option<Element> {
        self.0.parent.borrow().upgrade().map(Element)
    }

    #[must_use]
    pub fn children(&self) -> Vec<Element> {
        self.0.children.borrow().clone()
    }

    /// Check whether `other` is this element or one of its descendants.
    #[must_use]
    pub fn contains(&self, other: &Element) -> bool {
        let mut cursor = Some(other.clone());
        while let Some(el) = cursor {
            if el.ptr_eq(self) {
                return true;
            }
            cursor = el.parent();
        }
        false
    }

    /// Check whether this element matches the selector.
    #[must_use]
    pub fn matches(&self, selector: &Selector) -> bool {
        selector.matches(self)
    }

    /// The nearest inclusive ancestor matching the selector.
    #[must_use]
    pub fn closest(&self, selector: &Selector) -> Option<Element> {
        let mut cursor = Some(self.clone());
        while let Some(el) = cursor {
            if selector.matches(&el) {
                return Some(el);
            }
            cursor = el.parent();
        }
        None
    }

    /// The first descendant (depth-first, document order) matching the
    /// selector.
    #[must_use]
    pub fn query(&self, selector: &Selector) -> Option<Element> {
        for child in self.children() {
            if selector.matches(&child) {
                return Some(child);
            }
            if let Some(found) = child.query(selector) {
                return Some(found);
            }
        }
        None
    }

    /// The topmost element at a point, searching this subtree.
    ///
    /// Later siblings paint over earlier ones and children over parents.
    /// Elements without a rectangle are transparent but their children are
    /// still searched.
    #[must_use]
    pub fn hit_test(&self, x: i32, y: i32) -> Option<Element> {
        for child in self.children().iter().rev() {
            if let Some(hit) = child.hit_test(x, y) {
                return Some(hit);
            }
        }
        self.rect()
            .is_some_and(|r| r.contains(x, y))
            .then(|| self.clone())
    }

    /// The root of this element's tree.
    #[must_use]
    pub fn root(&self) -> Element {
        let mut el = self.clone();
        while let Some(parent) = el.parent() {
            el = parent;
        }
        el
    }

    // -------------------------------------------------------------------------
    // Native listeners
    // -------------------------------------------------------------------------

    /// Register a native listener.
    ///
    /// Returns `false` if the same `(event, callback, capture)` triple is
    /// already registered; the duplicate is ignored.
    pub fn add_event_listener(&self, event: &str, callback: &NativeListener, capture: bool) -> bool {
        let mut listeners = self.0.listeners.borrow_mut();
        let duplicate = listeners
            .iter()
            .any(|l| l.event == event && l.capture == capture && Rc::ptr_eq(&l.callback, callback));
        if !duplicate {
            listeners.push(NativeEntry {
                event: event.to_string(),
                callback: Rc::clone(callback),
                capture,
            });
        }
        !duplicate
    }

    /// Remove a native listener by callback identity.
    ///
    /// Returns whether a listener was removed.
    pub fn remove_event_listener(
        &self,
        event: &str,
        callback: &NativeListener,
        capture: bool,
    ) -> bool {
        let mut listeners = self.0.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|l| {
            !(l.event == event && l.capture == capture && Rc::ptr_eq(&l.callback, callback))
        });
        listeners.len() != before
    }

    /// Number of native listeners registered for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.0
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.event == event)
            .count()
    }

    /// Total number of native listeners on this element.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.0.listeners.borrow().len()
    }

    /// Dispatch an event at this element.
    ///
    /// Capture listeners run from the root down to the target's parent, then
    /// every listener on the target, then bubble listeners from the parent up
    /// to the root. Returns the number of listeners invoked. A failing
    /// listener aborts the dispatch.
    pub fn dispatch(&self, event: &DomEvent) -> Result<usize, StateError> {
        let mut path = Vec::new();
        let mut cursor = self.parent();
        while let Some(el) = cursor {
            cursor = el.parent();
            path.push(el);
        }

        let mut invoked = 0;
        for el in path.iter().rev() {
            invoked += el.run_listeners(event, Some(true))?;
            if event.is_propagation_stopped() {
                return Ok(invoked);
            }
        }
        invoked += self.run_listeners(event, None)?;
        for el in &path {
            if event.is_propagation_stopped() {
                break;
            }
            invoked += el.run_listeners(event, Some(false))?;
        }
        Ok(invoked)
    }

    fn run_listeners(&self, event: &DomEvent, capture: Option<bool>) -> Result<usize, StateError> {
        let snapshot: Vec<NativeListener> = self
            .0
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.event == event.kind && capture.is_none_or(|c| l.capture == c))
            .map(|l| Rc::clone(&l.callback))
            .collect();

        // Restored on every exit so a nested dispatch of the same event does
        // not clear the outer frame's current target.
        let previous = event.current_target.replace(Some(self.clone()));
        let result = snapshot.iter().try_for_each(|callback| callback(event));
        *event.current_target.borrow_mut() = previous;
        result.map(|()| snapshot.len())
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.0.tag)?;
        if let Some(id) = self.0.id.borrow().as_deref() {
            write!(f, "#{}", id)?;
        }
        for class in self.0.classes.borrow().iter() {
            write!(f, ".{}", class)?;
        }
        write!(f, ">")
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(s: &str) -> Selector {
        Selector::parse(s).expect("selector")
    }

    fn list_tree() -> (Element, Element, Element) {
        let root = Element::new("ul").with_id("menu");
        let item = Element::new("li").with_class("item").with_attr("data-id", "7");
        let link = Element::new("a").with_class("link");
        root.append_child(&item);
        item.append_child(&link);
        (root, item, link)
    }

    fn counter() -> (Rc<Cell<usize>>, NativeListener) {
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let cb: NativeListener = Rc::new(move |_: &DomEvent| {
            h.set(h.get() + 1);
            Ok(())
        });
        (hits, cb)
    }

    #[test]
    fn selector_parsing() {
        assert!(Selector::parse("li.item[data-id='7']").is_ok());
        assert!(Selector::parse("#menu, .item").is_ok());
        assert!(Selector::parse("*").is_ok());
        assert!(Selector::parse("ul li").is_err());
        assert!(Selector::parse("ul > li").is_err());
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse(".").is_err());
        assert!(Selector::parse("[=x]").is_err());
    }

    #[test]
    fn compound_matching() {
        let (root, item, link) = list_tree();
        assert!(item.matches(&sel("li.item")));
        assert!(item.matches(&sel("[data-id=7]")));
        assert!(item.matches(&sel("[data-id]")));
        assert!(!item.matches(&sel("li.other")));
        assert!(root.matches(&sel("#menu")));
        assert!(link.matches(&sel("span, a.link")));
    }

    #[test]
    fn closest_walks_ancestors() {
        let (root, item, link) = list_tree();
        assert_eq!(link.closest(&sel("li")), Some(item.clone()));
        assert_eq!(link.closest(&sel("a")), Some(link.clone()));
        assert_eq!(link.closest(&sel("#menu")), Some(root));
        assert_eq!(item.closest(&sel("table")), None);
    }

    #[test]
    fn tree_links() {
        let (root, item, link) = list_tree();
        assert!(root.contains(&link));
        assert!(!link.contains(&root));
        assert_eq!(link.root(), root);
        assert_eq!(root.query(&sel("a")), Some(link.clone()));

        item.detach();
        assert!(!root.contains(&link));
        assert!(root.children().is_empty());
    }

    #[test]
    fn native_listeners_dedup_and_remove_by_identity() {
        let el = Element::new("button");
        let (hits, cb) = counter();
        assert!(el.add_event_listener("click", &cb, false));
        assert!(!el.add_event_listener("click", &cb, false));
        assert!(el.add_event_listener("click", &cb, true));
        assert_eq!(el.listener_count("click"), 2);

        // A different closure with the same body removes nothing.
        let (_, other) = counter();
        assert!(!el.remove_event_listener("click", &other, false));

        assert!(el.remove_event_listener("click", &cb, false));
        el.dispatch(&DomEvent::new("click", &el)).expect("dispatch");
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn dispatch_bubbles_and_stops() {
        let (root, item, link) = list_tree();
        let (root_hits, root_cb) = counter();
        root.add_event_listener("click", &root_cb, false);
        let stopper: NativeListener = Rc::new(|e: &DomEvent| {
            e.stop_propagation();
            Ok(())
        });

        link.dispatch(&DomEvent::new("click", &link)).expect("dispatch");
        assert_eq!(root_hits.get(), 1);

        item.add_event_listener("click", &stopper, false);
        link.dispatch(&DomEvent::new("click", &link)).expect("dispatch");
        assert_eq!(root_hits.get(), 1);
    }

    #[test]
    fn capture_runs_before_target() {
        let (root, _item, link) = list_tree();
        let order = Rc::new(RefCell::new(Vec::new()));
        let o1 = Rc::clone(&order);
        let capture: NativeListener = Rc::new(move |_: &DomEvent| {
            o1.borrow_mut().push("capture");
            Ok(())
        });
        let o2 = Rc::clone(&order);
        let target: NativeListener = Rc::new(move |_: &DomEvent| {
            o2.borrow_mut().push("target");
            Ok(())
        });
        root.add_event_listener("click", &capture, true);
        link.add_event_listener("click", &target, false);
        link.dispatch(&DomEvent::new("click", &link)).expect("dispatch");
        assert_eq!(*order.borrow(), vec!["capture", "target"]);
    }

    #[test]
    fn element_and_event_accessors() {
        let (_, item, _) = list_tree();
        assert!(item.has_class("item"));
        assert!(!item.has_class("link"));
        item.add_class("active");
        assert!(item.has_class("active"));
        assert_eq!(item.attribute("data-id").as_deref(), Some("7"));
        item.set_attribute("data-id", "8");
        assert!(item.matches(&sel("[data-id=8]")));
        assert_eq!(item.attribute("missing"), None);

        assert_eq!(sel("#menu, .item").as_str(), "#menu, .item");

        let event = DomEvent::new("change", &item).with_detail(serde_json::json!({"value": 3}));
        assert_eq!(event.detail()["value"], serde_json::json!(3));
        assert!(DomEvent::new("click", &item).detail().is_null());
    }

    #[test]
    fn nested_dispatch_restores_current_target() {
        let (root, item, link) = list_tree();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let reentered = Rc::new(Cell::new(false));

        let sink = Rc::clone(&seen);
        let guard = Rc::clone(&reentered);
        let cb: NativeListener = Rc::new(move |e: &DomEvent| {
            if !guard.replace(true) {
                e.target().dispatch(e)?;
            }
            sink.borrow_mut().push(e.current_target());
            Ok(())
        });
        item.add_event_listener("click", &cb, false);

        link.dispatch(&DomEvent::new("click", &link)).expect("dispatch");
        // Inner frame then outer frame, both at `item`.
        assert_eq!(*seen.borrow(), vec![Some(item.clone()), Some(item.clone())]);

        let failing: NativeListener =
            Rc::new(|_: &DomEvent| -> Result<(), StateError> { Err(StateError::Detached) });
        root.add_event_listener("tap", &failing, false);
        let event = DomEvent::new("tap", &root);
        assert!(root.dispatch(&event).is_err());
        assert_eq!(event.current_target(), None);
    }

    #[test]
    fn weak_handle_does_not_keep_element_alive() {
        let el = Element::new("div");
        let weak = el.downgrade();
        assert_eq!(weak.upgrade(), Some(el.clone()));
        drop(el);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn hit_test_prefers_topmost() {
        let board = Element::new("div").with_rect(Rect::new(0, 0, 100, 100));
        let low = Element::new("div").with_id("low").with_rect(Rect::new(0, 0, 50, 50));
        let high = Element::new("div").with_id("high").with_rect(Rect::new(25, 25, 50, 50));
        board.append_child(&low);
        board.append_child(&high);

        assert_eq!(board.hit_test(10, 10), Some(low));
        assert_eq!(board.hit_test(30, 30), Some(high));
        assert_eq!(board.hit_test(90, 90), Some(board.clone()));
        assert_eq!(board.hit_test(100, 100), None);
    }
}
