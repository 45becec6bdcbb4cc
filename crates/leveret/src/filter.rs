// File: src/filter.rs
// Purpose: Input filters applied to request parameters before handlers see them

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*(>|$)").unwrap());

/// Transforms one parameter value
pub trait Filter: Send + Sync {
    fn filter(&self, value: Value) -> Value;
}

impl<F> Filter for F
where
    F: Fn(Value) -> Value + Send + Sync,
{
    fn filter(&self, value: Value) -> Value {
        self(value)
    }
}

/// Applies `f` to every string inside `value`, descending into arrays and objects
pub fn map_strings(value: Value, f: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(|v| map_strings(v, f)).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, map_strings(v, f)))
                .collect(),
        ),
        other => other,
    }
}

/// Removes markup and encodes quotes
///
/// ```
/// use leveret::filter::{Filter, StripTags};
/// use serde_json::json;
///
/// assert_eq!(
///     StripTags.filter(json!("<b>bold</b> \"move\"")),
///     json!("bold &#34;move&#34;")
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StripTags;

impl StripTags {
    pub fn strip(input: &str) -> String {
        TAG_REGEX
            .replace_all(input, "")
            .replace('"', "&#34;")
            .replace('\'', "&#39;")
    }
}

impl Filter for StripTags {
    fn filter(&self, value: Value) -> Value {
        map_strings(value, &StripTags::strip)
    }
}

/// Leaves values untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct Raw;

impl Filter for Raw {
    fn filter(&self, value: Value) -> Value {
        value
    }
}

/// Application-wide default filter selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFilter {
    #[default]
    StripTags,
    Raw,
}

impl InputFilter {
    pub fn build(self) -> Arc<dyn Filter> {
        match self {
            InputFilter::StripTags => Arc::new(StripTags),
            InputFilter::Raw => Arc::new(Raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_strip_tags() {
        assert_eq!(StripTags::strip("<script>alert(1)</script>hi"), "alert(1)hi");
        assert_eq!(StripTags::strip("a < b"), "a ");
        assert_eq!(StripTags::strip("it's"), "it&#39;s");
    }

    #[test]
    fn test_strip_tags_is_recursive() {
        let value = json!({"names": ["<i>ana</i>", "bo"], "age": 3, "ok": true});
        assert_eq!(
            StripTags.filter(value),
            json!({"names": ["ana", "bo"], "age": 3, "ok": true})
        );
    }

    #[test]
    fn test_strip_tags_idempotent() {
        let once = StripTags::strip("<p>\"x\"</p>");
        assert_eq!(StripTags::strip(&once), once);
    }

    #[test]
    fn test_raw_filter() {
        assert_eq!(Raw.filter(json!("<b>x</b>")), json!("<b>x</b>"));
    }

    #[test]
    fn test_closure_filter() {
        let upper = |v: Value| map_strings(v, &|s: &str| s.to_uppercase());
        assert_eq!(upper.filter(json!("maria")), json!("MARIA"));
    }
}
