//! Validation rules evaluated against a node's current value.
//!
//! Rules never interrupt control flow: each evaluates to
//! `Option<ValidationError>` and failures accumulate. Emptiness is
//! type-aware — numeric `0` is a real value, `""` is empty, and an
//! unchecked checkbox never violates a required flag.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use formtree_core::ValidationError;

use crate::schema::FieldType;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("valid regex")
});

/// A single validation rule attached to a form node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// The value must be non-empty, per the field type's notion of empty.
    Required(FieldType),
    /// Non-empty values must be well-formed email addresses.
    Email,
    /// Non-empty values must be ISO dates (`YYYY-MM-DD`).
    Date,
}

impl Rule {
    /// Evaluates this rule against a value.
    ///
    /// Format rules ([`Rule::Email`], [`Rule::Date`]) pass on empty input;
    /// emptiness is [`Rule::Required`]'s concern alone, so an optional
    /// email field left blank stays valid.
    pub fn check(&self, value: &Value) -> Option<ValidationError> {
        match self {
            Self::Required(field_type) => {
                if is_empty(*field_type, value) {
                    Some(ValidationError::new("This field is required.", "required"))
                } else {
                    None
                }
            }
            Self::Email => match value.as_str() {
                Some("") | None => None,
                Some(s) if EMAIL_RE.is_match(s) => None,
                Some(_) => Some(ValidationError::new(
                    "Enter a valid email address.",
                    "email",
                )),
            },
            Self::Date => match value.as_str() {
                Some("") | None => None,
                Some(s) if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() => None,
                Some(_) => Some(ValidationError::new(
                    "Enter a valid date (YYYY-MM-DD).",
                    "date",
                )),
            },
        }
    }
}

fn is_empty(field_type: FieldType, value: &Value) -> bool {
    match field_type {
        FieldType::Checkbox => false,
        _ => match value {
            Value::Number(_) | Value::Bool(_) => false,
            Value::String(s) => s.is_empty(),
            Value::Null => true,
            Value::Array(items) => items.is_empty(),
            Value::Object(_) => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_text_empty_string_fails() {
        let rule = Rule::Required(FieldType::Text);
        assert_eq!(rule.check(&json!("")).unwrap().code, "required");
        assert!(rule.check(&json!("x")).is_none());
    }

    #[test]
    fn test_required_number_zero_is_not_empty() {
        let rule = Rule::Required(FieldType::Number);
        assert!(rule.check(&json!(0)).is_none());
        assert!(rule.check(&Value::Null).is_some());
    }

    #[test]
    fn test_required_checkbox_false_is_valid() {
        let rule = Rule::Required(FieldType::Checkbox);
        assert!(rule.check(&json!(false)).is_none());
    }

    #[test]
    fn test_email_rule() {
        let rule = Rule::Email;
        assert!(rule.check(&json!("a@b.com")).is_none());
        assert_eq!(rule.check(&json!("x")).unwrap().code, "email");
        assert_eq!(rule.check(&json!("a@b")).unwrap().code, "email");
        // Blank is the required rule's concern.
        assert!(rule.check(&json!("")).is_none());
    }

    #[test]
    fn test_date_rule() {
        let rule = Rule::Date;
        assert!(rule.check(&json!("1990-05-15")).is_none());
        assert_eq!(rule.check(&json!("15/05/1990")).unwrap().code, "date");
        assert!(rule.check(&json!("")).is_none());
    }
}
