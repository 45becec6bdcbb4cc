// File: src/validation/mod.rs
// Purpose: Request parameter validation against route constraints

pub mod constraints;

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::Violations;

pub use constraints::{Email, Length, Matches, NotBlank, OneOf};

/// Message recorded for a required parameter that was not supplied
pub const REQUIRED_PARAM_MISSING: &str = "Required param missing!";

/// A validation rule for a single parameter value
///
/// Returns the violation messages when the value is rejected.
pub trait Constraint: Send + Sync {
    fn validate(&self, value: &Value) -> Result<(), Vec<String>>;
}

impl<F> Constraint for F
where
    F: Fn(&Value) -> Result<(), Vec<String>> + Send + Sync,
{
    fn validate(&self, value: &Value) -> Result<(), Vec<String>> {
        self(value)
    }
}

/// Constraints attached to one parameter, in registration order
pub type ParamConstraints = (String, Vec<Arc<dyn Constraint>>);

/// Emptiness as understood by form input
///
/// `null`, `false`, `""`, `"0"`, `0`, and empty arrays or objects are empty.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// String form of a scalar value; non-scalars render as JSON
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Merges parameter sources; the first source to define a name wins
pub fn merge_sources<'a>(sources: impl IntoIterator<Item = &'a Map<String, Value>>) -> Map<String, Value> {
    sources.into_iter().fold(Map::new(), |mut merged, source| {
        for (name, value) in source {
            if !merged.contains_key(name) {
                merged.insert(name.clone(), value.clone());
            }
        }
        merged
    })
}

/// Checks merged parameters against required names and constraints
///
/// Constraints run only for present parameters that are required or non-empty.
pub fn validate_params(
    merged: &Map<String, Value>,
    required: &[String],
    constraints: &[ParamConstraints],
) -> Violations {
    let mut violations = Violations::new();

    for name in required {
        if !merged.contains_key(name) {
            violations.add(name.as_str(), REQUIRED_PARAM_MISSING);
        }
    }

    for (name, rules) in constraints {
        let Some(value) = merged.get(name) else {
            continue;
        };
        if !required.contains(name) && is_empty_value(value) {
            continue;
        }

        for rule in rules {
            if let Err(messages) = rule.validate(value) {
                violations.extend(name, messages);
            }
        }
    }

    violations
}
