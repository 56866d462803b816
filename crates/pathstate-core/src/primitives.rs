//! # Primitives
//!
//! Hardcoded conventions shared by the resolver, the bus and the store.
//!
//! These are part of the external contract: event names, path syntax and
//! option keys that callers rely on.

/// Separator between segments of a string key path.
pub const PATH_SEPARATOR: char = '.';

/// Segment suffix meaning "autovivify an array here and append".
///
/// `set("list[]", x)` pushes `x` onto the array at `list`.
pub const APPEND_SUFFIX: &str = "[]";

/// Largest gap of `null`s a write past the end of an array may pad.
///
/// `set("xs.9", v)` on a three-element array pads six slots; an index further
/// than this beyond the end is refused.
pub const MAX_ARRAY_PADDING: usize = 65_536;

/// Prefix of every store change notification.
///
/// A write to key `cart.items` fires `store:cart.items`.
pub const STORE_EVENT_PREFIX: &str = "store:";

/// Option key carrying the registration discriminator.
pub const ID_OPTION: &str = "id";

/// Option key selecting the capture phase for native listeners.
pub const CAPTURE_OPTION: &str = "capture";

/// Prefix for ids generated by `once` registrations.
pub const ONCE_ID_PREFIX: &str = "once-";

/// Native event types resolved by pointer hit-testing during live delegation.
///
/// During a drag the event target is the dragged element, not the element
/// under the pointer, so `closest` on the target would resolve the wrong
/// element.
pub const DRAG_EVENTS: &[&str] = &[
    "drag",
    "dragstart",
    "dragend",
    "dragenter",
    "dragover",
    "dragleave",
    "drop",
];

/// Build the store notification name for a key.
#[must_use]
pub fn store_event(key: &str) -> String {
    format!("{}{}", STORE_EVENT_PREFIX, key)
}

/// Check whether an event type is a drag/drop event.
#[must_use]
pub fn is_drag_event(event: &str) -> bool {
    DRAG_EVENTS.contains(&event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_event_names() {
        assert_eq!(store_event("cart.items"), "store:cart.items");
        assert_eq!(store_event(""), "store:");
    }

    #[test]
    fn drag_events_detected() {
        assert!(is_drag_event("dragover"));
        assert!(is_drag_event("drop"));
        assert!(!is_drag_event("click"));
    }
}
