//! Field rules for JSON request bodies.

use serde_json::Value;

use crate::error::{ApiError, FieldErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    /// Present values must be JSON strings.
    String,
    Min(usize),
    Max(usize),
    Email,
}

/// Apply `rules` to `data`, collecting every message per field.
///
/// Only `Required` fires for an absent field.
pub fn validate(data: &Value, rules: &[(&str, &[Rule])]) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for (field, field_rules) in rules {
        let value = data.get(*field).filter(|v| !v.is_null());
        for rule in field_rules.iter() {
            let message = match (rule, value) {
                (Rule::Required, v) if v.map(is_empty).unwrap_or(true) => {
                    Some(format!("The {} field is required.", field))
                }
                (Rule::String, Some(v)) if !v.is_string() => {
                    Some(format!("The {} field must be a string.", field))
                }
                (Rule::Min(min), Some(v)) if text_len(v) < *min => {
                    Some(format!("The {} field must be at least {} characters.", field, min))
                }
                (Rule::Max(max), Some(v)) if text_len(v) > *max => {
                    Some(format!("The {} field must not exceed {} characters.", field, max))
                }
                (Rule::Email, Some(v)) if !v.as_str().map(is_email).unwrap_or(false) => {
                    Some(format!("The {} field must be a valid email address.", field))
                }
                _ => None,
            };
            if let Some(message) = message {
                errors.entry(field.to_string()).or_default().push(message);
            }
        }
    }

    errors
}

/// `validate`, turned into a 422 when anything failed.
pub fn require_valid(data: &Value, rules: &[(&str, &[Rule])]) -> Result<(), ApiError> {
    let errors = validate(data, rules);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Validation failed", errors))
    }
}

/// Parse a request body leniently: anything that is not a JSON object is `{}`.
pub fn parse_body(bytes: &[u8]) -> Value {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value @ Value::Object(_)) => value,
        _ => Value::Object(Default::default()),
    }
}

/// String field, or "" when absent or not a string.
pub fn text_field<'a>(data: &'a Value, field: &str) -> &'a str {
    data.get(field).and_then(Value::as_str).unwrap_or_default()
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Number(_) => false,
    }
}

/// Character count of a string. Anything else counts as empty text.
fn text_len(value: &Value) -> usize {
    value.as_str().map(|s| s.chars().count()).unwrap_or(0)
}

/// One `@`, a non-empty local part and a dotted domain without blanks.
fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || value.chars().any(char::is_whitespace) {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels
            .iter()
            .all(|l| !l.is_empty() && !l.starts_with('-') && !l.ends_with('-') && l.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const REGISTER: &[(&str, &[Rule])] = &[
        ("name", &[Rule::Required, Rule::String, Rule::Min(2), Rule::Max(255)]),
        ("email", &[Rule::Required, Rule::String, Rule::Email, Rule::Max(255)]),
        ("password", &[Rule::Required, Rule::String, Rule::Min(6), Rule::Max(255)]),
    ];

    #[test]
    fn valid_payload_has_no_errors() {
        let data = json!({"name": "Ada", "email": "ada@example.com", "password": "secret123"});
        assert!(validate(&data, REGISTER).is_empty());
    }

    #[test]
    fn collects_messages_per_field() {
        let data = json!({"name": "A", "email": "not-an-email", "password": ""});
        let errors = validate(&data, REGISTER);

        assert_eq!(errors["name"], vec!["The name field must be at least 2 characters."]);
        assert_eq!(errors["email"], vec!["The email field must be a valid email address."]);
        assert_eq!(
            errors["password"],
            vec![
                "The password field is required.",
                "The password field must be at least 6 characters."
            ]
        );
    }

    #[test]
    fn absent_fields_only_fail_required() {
        let errors = validate(&json!({}), REGISTER);
        assert_eq!(errors["name"], vec!["The name field is required."]);
        assert_eq!(errors["email"], vec!["The email field is required."]);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn max_counts_characters() {
        let long = "x".repeat(256);
        let rules: &[(&str, &[Rule])] = &[("name", &[Rule::Max(255)])];
        let errors = validate(&json!({"name": long}), rules);
        assert_eq!(errors["name"], vec!["The name field must not exceed 255 characters."]);
    }

    #[test]
    fn non_string_values_fail_text_rules() {
        let data = json!({"name": 12345, "email": "n@example.com", "password": 1234567});
        let errors = validate(&data, REGISTER);

        assert_eq!(
            errors["name"],
            vec![
                "The name field must be a string.",
                "The name field must be at least 2 characters."
            ]
        );
        assert_eq!(
            errors["password"],
            vec![
                "The password field must be a string.",
                "The password field must be at least 6 characters."
            ]
        );
        assert!(!errors.contains_key("email"));

        let rules: &[(&str, &[Rule])] = &[("password", &[Rule::Required, Rule::String])];
        let errors = validate(&json!({"password": true}), rules);
        assert_eq!(errors["password"], vec!["The password field must be a string."]);
    }

    #[test]
    fn email_shapes() {
        assert!(is_email("ada@example.com"));
        assert!(is_email("first.last+tag@mail.example.org"));
        assert!(!is_email("ada@localhost"));
        assert!(!is_email("ada@@example.com"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("ada @example.com"));
        assert!(!is_email("ada@example..com"));
    }

    #[test]
    fn lenient_body_parsing() {
        assert_eq!(parse_body(b"not json"), json!({}));
        assert_eq!(parse_body(b"[1,2]"), json!({}));
        assert_eq!(parse_body(br#"{"a":1}"#), json!({"a": 1}));
    }

    #[test]
    fn require_valid_maps_to_422() {
        let err = require_valid(&json!({}), REGISTER).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }
}
