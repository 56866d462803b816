//! Integration tests for the scenario runner and CLI commands.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use pathstate::cli::{compare_values, resolve_path, run_file};
use pathstate_core::StateError;
use serde_json::json;
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// =============================================================================
// RUN COMMAND TESTS
// =============================================================================

const CART_TOML: &str = r#"
name = "cart"

[[step]]
op = "watch"
key = "cart.items.1"

[[step]]
op = "set"
key = "cart.items[]"
value = { id = 1, qty = 1 }

[[step]]
op = "set"
key = "cart.items[]"
value = { id = 2, qty = 1 }

[[step]]
op = "set"
key = "cart.items[]"
value = { id = 3, qty = 1 }

[[step]]
op = "find"
key = "cart.items"
probe = { id = 2 }
expect = { id = 2, qty = 1 }

[[step]]
op = "replace"
key = "cart.items"
value = { id = 2, qty = 5 }

[[step]]
op = "get"
key = "cart.items.1"
expect = { id = 2, qty = 5 }
"#;

#[test]
fn test_cart_scenario_from_toml() {
    let file = write_temp(".toml", CART_TOML);
    let outcome = run_file(file.path(), None).unwrap();

    assert_eq!(outcome.name.as_deref(), Some("cart"));
    assert_eq!(outcome.steps.len(), 7);
    assert_eq!(outcome.notifications.len(), 1);
    assert_eq!(outcome.notifications[0].event, "store:cart.items.1");
    assert_eq!(
        outcome.snapshot["cart"]["items"],
        json!([
            {"id": 1, "qty": 1},
            {"id": 2, "qty": 5},
            {"id": 3, "qty": 1}
        ])
    );
}

#[test]
fn test_json_scenario_by_extension() {
    let file = write_temp(
        ".json",
        r#"{
            "initial": {"tags": ["a"]},
            "steps": [
                {"op": "add", "key": "tags", "items": ["a", "b"]},
                {"op": "remove", "key": "tags", "items": ["a"]},
                {"op": "get", "key": "tags", "expect": ["b"]}
            ]
        }"#,
    );
    let outcome = run_file(file.path(), None).unwrap();
    assert_eq!(outcome.snapshot, json!({"tags": ["b"]}));
}

#[test]
fn test_explicit_format_overrides_extension() {
    let file = write_temp(".txt", r#"{"steps": [{"op": "set", "key": "x", "value": 1}]}"#);
    assert!(run_file(file.path(), Some("json")).is_ok());
    assert!(matches!(
        run_file(file.path(), None),
        Err(StateError::Serialization(_))
    ));
}

#[test]
fn test_paused_watch_is_silent() {
    let file = write_temp(
        ".toml",
        r#"
[[step]]
op = "watch"
key = "n"
id = "w"

[[step]]
op = "pause"
event = "store:n"
id = "w"

[[step]]
op = "set"
key = "n"
value = 1

[[step]]
op = "unpause"
event = "store:n"

[[step]]
op = "set"
key = "n"
value = 2

[[step]]
op = "unwatch"
key = "n"
id = "w"

[[step]]
op = "set"
key = "n"
value = 3
"#,
    );
    let outcome = run_file(file.path(), None).unwrap();
    assert_eq!(outcome.notifications.len(), 1);
    assert_eq!(outcome.notifications[0].args, vec![json!(2), json!("n")]);
    assert_eq!(outcome.steps[5].result, json!(1));
}

#[test]
fn test_fire_reaches_watchers() {
    let file = write_temp(
        ".json",
        r#"{"steps": [
            {"op": "watch", "key": "k"},
            {"op": "fire", "event": "store:k", "args": ["manual"]}
        ]}"#,
    );
    let outcome = run_file(file.path(), None).unwrap();
    assert_eq!(outcome.steps[1].result, json!(1));
    assert_eq!(outcome.notifications[0].args, vec![json!("manual")]);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(matches!(run_file(&missing, None), Err(StateError::Io(_))));
}

#[test]
fn test_directory_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(run_file(dir.path(), None), Err(StateError::Io(_))));
}

// =============================================================================
// PATH COMMAND TESTS
// =============================================================================

#[test]
fn test_path_get_has_set() {
    let file = write_temp(".json", r#"{"user": {"name": "Ada", "nick": null}}"#);

    assert_eq!(
        resolve_path(file.path(), "user.name", None, false).unwrap(),
        json!("Ada")
    );
    assert_eq!(
        resolve_path(file.path(), "user.nick", None, true).unwrap(),
        json!(true)
    );
    assert_eq!(
        resolve_path(file.path(), "user.age", None, false).unwrap(),
        json!(null)
    );
    assert_eq!(
        resolve_path(file.path(), "user.tags[]", Some("\"x\""), false).unwrap(),
        json!({"user": {"name": "Ada", "nick": null, "tags": ["x"]}})
    );
}

#[test]
fn test_path_rejects_bad_literal() {
    let file = write_temp(".json", "{}");
    assert!(matches!(
        resolve_path(file.path(), "a", Some("not json"), false),
        Err(StateError::Serialization(_))
    ));
}

// =============================================================================
// COMPARE COMMAND TESTS
// =============================================================================

#[test]
fn test_compare_verdicts() {
    let verdict = compare_values(r#"{"a":1,"b":[1,2]}"#, r#"{"b":[2]}"#).unwrap();
    assert_eq!(verdict, json!({"includes": true, "matches": false}));

    let verdict = compare_values("[1,2,3]", "[3,1,2]").unwrap();
    assert_eq!(verdict, json!({"includes": true, "matches": true}));
}
