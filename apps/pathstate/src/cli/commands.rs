//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Each command has a pure half returning JSON (used by the tests) and a
//! `cmd_*` half that prints it.

use crate::scenario::{self, Outcome, ScenarioFormat};
use pathstate_core::{StateError, Value, compare, path};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum scenario file size (10 MB).
const MAX_SCENARIO_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Maximum JSON document size for `path` (100 MB).
const MAX_DOCUMENT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), StateError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| StateError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(StateError::Serialization(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate an input file path.
///
/// Canonicalizes the path (resolving symlinks and "..") and requires a
/// regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, StateError> {
    let canonical = path.canonicalize().map_err(|e| {
        StateError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(StateError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate and read a file into a string.
fn read_input(path: &Path, max_size: u64) -> Result<String, StateError> {
    let canonical = validate_file_path(path)?;
    validate_file_size(&canonical, max_size)?;
    std::fs::read_to_string(&canonical)
        .map_err(|e| StateError::Io(format!("Cannot read '{}': {}", path.display(), e)))
}

fn parse_literal(source: &str, what: &str) -> Result<Value, StateError> {
    serde_json::from_str(source)
        .map_err(|e| StateError::Serialization(format!("Invalid JSON {}: {}", what, e)))
}

fn print_json(value: &Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

// =============================================================================
// RUN COMMAND
// =============================================================================

/// Load and replay a scenario file.
pub fn run_file(file: &Path, format: Option<&str>) -> Result<Outcome, StateError> {
    let format = match format {
        Some(name) => ScenarioFormat::from_name(name)?,
        None => ScenarioFormat::from_path(file),
    };
    let source = read_input(file, MAX_SCENARIO_FILE_SIZE)?;
    let parsed = scenario::parse(&source, format)?;
    scenario::run(&parsed)
}

/// Replay a scenario file and print the outcome.
pub fn cmd_run(
    file: &Path,
    format: Option<&str>,
    json_mode: bool,
    verbose: bool,
) -> Result<(), StateError> {
    let outcome = run_file(file, format)?;

    if json_mode {
        let output = serde_json::to_value(&outcome)
            .map_err(|e| StateError::Serialization(e.to_string()))?;
        print_json(&output);
        return Ok(());
    }

    println!(
        "Scenario: {}",
        outcome.name.as_deref().unwrap_or("(unnamed)")
    );
    println!("==========");
    println!("Steps:         {}", outcome.steps.len());
    println!("Notifications: {}", outcome.notifications.len());

    if verbose {
        println!();
        for report in &outcome.steps {
            println!("  [{}] {:<8} -> {}", report.index, report.op, report.result);
        }
        println!();
        for note in &outcome.notifications {
            println!("  {} {}", note.event, Value::from(note.args.clone()));
        }
    }

    println!();
    println!("Final state:");
    print_json(&outcome.snapshot);
    Ok(())
}

// =============================================================================
// PATH COMMAND
// =============================================================================

/// Resolve a key against a JSON document file.
///
/// - `has`: returns a boolean
/// - `set`: returns the updated document (the file is not modified)
/// - otherwise: returns the value at the key, or `null` if absent
pub fn resolve_path(
    file: &Path,
    key: &str,
    set: Option<&str>,
    has: bool,
) -> Result<Value, StateError> {
    let source = read_input(file, MAX_DOCUMENT_FILE_SIZE)?;
    let mut doc = parse_literal(&source, "document")?;

    if has {
        return Ok(Value::Bool(path::has(&doc, key)));
    }
    if let Some(literal) = set {
        let value = parse_literal(literal, "value")?;
        path::set(&mut doc, key, value);
        return Ok(doc);
    }
    Ok(path::get_or(&doc, key, Value::Null))
}

/// Resolve a key path and print the result.
pub fn cmd_path(
    file: &Path,
    key: &str,
    set: Option<&str>,
    has: bool,
    json_mode: bool,
) -> Result<(), StateError> {
    let result = resolve_path(file, key, set, has)?;

    if json_mode {
        print_json(&serde_json::json!({
            "file": file.to_string_lossy(),
            "key": key,
            "result": result,
        }));
        return Ok(());
    }

    print_json(&result);
    Ok(())
}

// =============================================================================
// COMPARE COMMAND
// =============================================================================

/// Compare two JSON literals; returns `{includes, matches}`.
pub fn compare_values(value: &str, search: &str) -> Result<Value, StateError> {
    let value = parse_literal(value, "value")?;
    let search = parse_literal(search, "search")?;
    Ok(serde_json::json!({
        "includes": compare::includes(&value, &search),
        "matches": compare::matches(&value, &search),
    }))
}

/// Compare two JSON literals and print the verdicts.
pub fn cmd_compare(value: &str, search: &str, json_mode: bool) -> Result<(), StateError> {
    let verdict = compare_values(value, search)?;

    if json_mode {
        print_json(&verdict);
        return Ok(());
    }

    println!("includes: {}", verdict["includes"]);
    println!("matches:  {}", verdict["matches"]);
    Ok(())
}
