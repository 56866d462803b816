//! # Scenario Runner
//!
//! A scenario is a list of store and bus steps replayed against a fresh
//! `Store`. Files are TOML by default or JSON by extension:
//!
//! ```toml
//! name = "cart"
//!
//! [initial]
//! user = { name = "Ada" }
//!
//! [[step]]
//! op = "watch"
//! key = "cart.items.1"
//!
//! [[step]]
//! op = "set"
//! key = "cart.items[]"
//! value = { id = 1, qty = 1 }
//!
//! [[step]]
//! op = "get"
//! key = "cart.items.0.qty"
//! expect = 1
//! ```
//!
//! Every `watch` step records the notifications it receives; the outcome
//! lists them in firing order. A step with `expect` fails the run when the
//! observed result differs (structural `matches`).
//!
//! TOML has no `null`; scenarios that need to store `null` use JSON.

use pathstate_core::{EventBus, Options, StateError, Store, Value, compare};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

// =============================================================================
// SCENARIO FORMAT
// =============================================================================

/// On-disk scenario encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScenarioFormat {
    #[default]
    Toml,
    Json,
}

impl ScenarioFormat {
    /// Pick the format from a file extension; anything but `.json` is TOML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }

    /// Parse a `--format` argument.
    pub fn from_name(name: &str) -> Result<Self, StateError> {
        match name.to_ascii_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            other => Err(StateError::Scenario(format!(
                "Unknown scenario format '{}' (expected toml or json)",
                other
            ))),
        }
    }
}

// =============================================================================
// SCENARIO DEFINITION
// =============================================================================

/// A parsed scenario file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Seed data for the store root; must be an object when present.
    #[serde(default)]
    pub initial: Option<Value>,

    /// Steps in execution order.
    #[serde(default, rename = "step", alias = "steps")]
    pub steps: Vec<Step>,
}

/// One scenario step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Step {
    Set {
        key: String,
        value: Value,
        #[serde(default)]
        expect: Option<bool>,
    },
    Get {
        key: String,
        #[serde(default)]
        expect: Option<Value>,
    },
    Unset {
        key: String,
    },
    Has {
        key: String,
        #[serde(default)]
        expect: Option<bool>,
    },
    Add {
        key: String,
        items: Vec<Value>,
    },
    Remove {
        key: String,
        items: Vec<Value>,
    },
    Find {
        key: String,
        probe: Value,
        #[serde(default)]
        expect: Option<Value>,
    },
    Replace {
        key: String,
        value: Value,
    },
    Watch {
        key: String,
        #[serde(default)]
        id: Option<String>,
    },
    Unwatch {
        key: String,
        #[serde(default)]
        id: Option<String>,
    },
    Pause {
        event: String,
        #[serde(default)]
        id: Option<String>,
    },
    Unpause {
        event: String,
        #[serde(default)]
        id: Option<String>,
    },
    Fire {
        event: String,
        #[serde(default)]
        args: Vec<Value>,
    },
}

impl Step {
    /// The step's `op` tag.
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Self::Set { .. } => "set",
            Self::Get { .. } => "get",
            Self::Unset { .. } => "unset",
            Self::Has { .. } => "has",
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::Find { .. } => "find",
            Self::Replace { .. } => "replace",
            Self::Watch { .. } => "watch",
            Self::Unwatch { .. } => "unwatch",
            Self::Pause { .. } => "pause",
            Self::Unpause { .. } => "unpause",
            Self::Fire { .. } => "fire",
        }
    }
}

/// Parse scenario source text.
pub fn parse(source: &str, format: ScenarioFormat) -> Result<Scenario, StateError> {
    let scenario: Scenario = match format {
        ScenarioFormat::Toml => toml::from_str(source)
            .map_err(|e| StateError::Serialization(format!("Invalid TOML scenario: {}", e)))?,
        ScenarioFormat::Json => serde_json::from_str(source)
            .map_err(|e| StateError::Serialization(format!("Invalid JSON scenario: {}", e)))?,
    };

    if scenario.initial.as_ref().is_some_and(|v| !v.is_object()) {
        return Err(StateError::Scenario(
            "'initial' must be a table/object".to_string(),
        ));
    }
    Ok(scenario)
}

// =============================================================================
// OUTCOME
// =============================================================================

/// A notification observed by a `watch` step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub event: String,
    pub args: Vec<Value>,
}

/// The observed result of one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub op: &'static str,
    pub result: Value,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub name: Option<String>,
    pub steps: Vec<StepReport>,
    pub notifications: Vec<Notification>,
    pub snapshot: Value,
}

// =============================================================================
// RUNNER
// =============================================================================

/// Replay a scenario against a fresh store and bus.
pub fn run(scenario: &Scenario) -> Result<Outcome, StateError> {
    let bus = Rc::new(EventBus::new());
    let store = match &scenario.initial {
        Some(data) => Store::with_data(Rc::clone(&bus), data.clone()),
        None => Store::with_bus(Rc::clone(&bus)),
    };
    let log: Rc<RefCell<Vec<Notification>>> = Rc::new(RefCell::new(Vec::new()));

    tracing::info!(
        scenario = scenario.name.as_deref().unwrap_or("unnamed"),
        steps = scenario.steps.len(),
        "running scenario"
    );

    let mut reports = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.iter().enumerate() {
        let result = apply(&store, &bus, &log, step)
            .map_err(|e| StateError::Scenario(format!("step {} ({}): {}", index, step.op(), e)))?;
        check(index, step, &result)?;
        tracing::debug!(index, op = step.op(), %result, "step applied");
        reports.push(StepReport {
            index,
            op: step.op(),
            result,
        });
    }

    let notifications = log.borrow().clone();
    Ok(Outcome {
        name: scenario.name.clone(),
        steps: reports,
        notifications,
        snapshot: store.snapshot(),
    })
}

fn tag(id: Option<&String>) -> Options {
    id.map(|i| Options::id(i.as_str())).unwrap_or_default()
}

fn apply(
    store: &Store,
    bus: &EventBus,
    log: &Rc<RefCell<Vec<Notification>>>,
    step: &Step,
) -> Result<Value, StateError> {
    let result = match step {
        Step::Set { key, value, .. } => Value::Bool(store.set(key, value.clone())?),
        Step::Get { key, .. } => store.get(key).unwrap_or(Value::Null),
        Step::Unset { key } => Value::Bool(store.unset(key)),
        Step::Has { key, .. } => Value::Bool(store.has(key)),
        Step::Add { key, items } => Value::Bool(store.add(key, items)?),
        Step::Remove { key, items } => Value::Bool(store.remove(key, items)?),
        Step::Find { key, probe, .. } => store.find(key, probe).unwrap_or(Value::Null),
        Step::Replace { key, value } => Value::Bool(store.replace(key, value.clone())?),
        Step::Watch { key, id } => {
            let sink = Rc::clone(log);
            let event = pathstate_core::primitives::store_event(key);
            store.watch_with(key, tag(id.as_ref()), move |args| {
                sink.borrow_mut().push(Notification {
                    event: event.clone(),
                    args: args.to_vec(),
                });
                Ok(())
            });
            Value::Null
        }
        Step::Unwatch { key, id } => Value::from(store.unwatch(key, tag(id.as_ref()))),
        Step::Pause { event, id } => Value::from(bus.pause(event, tag(id.as_ref()))),
        Step::Unpause { event, id } => Value::from(bus.unpause(event, tag(id.as_ref()))),
        Step::Fire { event, args } => Value::from(bus.fire(event, args)?),
    };
    Ok(result)
}

fn check(index: usize, step: &Step, result: &Value) -> Result<(), StateError> {
    let expected = match step {
        Step::Set {
            expect: Some(e), ..
        }
        | Step::Has {
            expect: Some(e), ..
        } => Value::Bool(*e),
        Step::Get {
            expect: Some(e), ..
        }
        | Step::Find {
            expect: Some(e), ..
        } => e.clone(),
        _ => return Ok(()),
    };

    if compare::matches(result, &expected) {
        Ok(())
    } else {
        Err(StateError::Scenario(format!(
            "step {} ({}): expected {}, got {}",
            index,
            step.op(),
            expected,
            result
        )))
    }
}

// =============================================================================
// TESTS
// =============================================================================
