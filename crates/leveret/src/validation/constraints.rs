// File: src/validation/constraints.rs
// Purpose: Built-in parameter constraints

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{value_to_string, Constraint};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

/// Value must be one of a fixed set of choices
#[derive(Debug, Clone)]
pub struct OneOf {
    choices: Vec<String>,
}

impl OneOf {
    pub fn new<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }
}

impl Constraint for OneOf {
    fn validate(&self, value: &Value) -> Result<(), Vec<String>> {
        let value = value_to_string(value);
        if self.choices.iter().any(|c| *c == value) {
            return Ok(());
        }
        Err(vec![format!(
            "The value \"{}\" is not allowed. Allowed values: {}.",
            value,
            self.choices.join(", ")
        )])
    }
}

/// Value must contain something other than whitespace
#[derive(Debug, Clone, Default)]
pub struct NotBlank;

impl Constraint for NotBlank {
    fn validate(&self, value: &Value) -> Result<(), Vec<String>> {
        if value_to_string(value).trim().is_empty() {
            Err(vec!["This value should not be blank.".to_string()])
        } else {
            Ok(())
        }
    }
}

/// Character count must lie within bounds
#[derive(Debug, Clone, Default)]
pub struct Length {
    min: Option<usize>,
    max: Option<usize>,
}

impl Length {
    pub fn between(min: usize, max: usize) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn min(min: usize) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn max(max: usize) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }
}

impl Constraint for Length {
    fn validate(&self, value: &Value) -> Result<(), Vec<String>> {
        let count = value_to_string(value).chars().count();
        let mut errors = Vec::new();

        if let Some(min) = self.min.filter(|min| count < *min) {
            errors.push(format!(
                "This value is too short. It should have {} characters or more.",
                min
            ));
        }
        if let Some(max) = self.max.filter(|max| count > *max) {
            errors.push(format!(
                "This value is too long. It should have {} characters or less.",
                max
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Value must match a regular expression
#[derive(Debug, Clone)]
pub struct Matches {
    regex: Regex,
    message: String,
}

impl Matches {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            message: "This value is not valid.".to_string(),
        })
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl Constraint for Matches {
    fn validate(&self, value: &Value) -> Result<(), Vec<String>> {
        if self.regex.is_match(&value_to_string(value)) {
            Ok(())
        } else {
            Err(vec![self.message.clone()])
        }
    }
}

/// Value must look like an email address
#[derive(Debug, Clone, Default)]
pub struct Email;

impl Constraint for Email {
    fn validate(&self, value: &Value) -> Result<(), Vec<String>> {
        if EMAIL_REGEX.is_match(&value_to_string(value)) {
            Ok(())
        } else {
            Err(vec!["This value is not a valid email address.".to_string()])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!("paco"), true)]
    #[case(json!("maria"), true)]
    #[case(json!("pepe"), false)]
    #[case(json!(""), false)]
    fn test_one_of(#[case] value: Value, #[case] ok: bool) {
        let rule = OneOf::new(["paco", "maria"]);
        assert_eq!(rule.validate(&value).is_ok(), ok);
    }

    #[test]
    fn test_not_blank() {
        assert!(NotBlank.validate(&json!("x")).is_ok());
        assert!(NotBlank.validate(&json!("   ")).is_err());
        assert!(NotBlank.validate(&json!(null)).is_err());
    }

    #[rstest]
    #[case("ab", false)]
    #[case("abc", true)]
    #[case("abcdefghij", true)]
    #[case("abcdefghijk", false)]
    fn test_length_between(#[case] value: &str, #[case] ok: bool) {
        assert_eq!(Length::between(3, 10).validate(&json!(value)).is_ok(), ok);
    }

    #[test]
    fn test_length_counts_chars() {
        assert!(Length::max(3).validate(&json!("ñañ")).is_ok());
    }

    #[test]
    fn test_matches() {
        let rule = Matches::new(r"^\d{4}$").unwrap().with_message("Need a year.");
        assert!(rule.validate(&json!("2024")).is_ok());
        assert_eq!(rule.validate(&json!("24")), Err(vec!["Need a year.".to_string()]));
        assert!(rule.validate(&json!(1999)).is_ok());
    }

    #[test]
    fn test_email() {
        assert!(Email.validate(&json!("ana@example.com")).is_ok());
        assert!(Email.validate(&json!("ana@")).is_err());
    }
}
