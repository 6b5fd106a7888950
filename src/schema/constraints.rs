//! Stateless evaluation of field constraints against runtime values.
//!
//! Evaluation is permissive: a constraint that cannot be applied to the
//! value's dynamic type (a length bound on a number, a pattern on a bool,
//! an unparseable regex, a non-numeric bound) yields no error. Only values
//! that definitively break a rule are rejected.

use crate::error::ConstraintError;
use crate::schema::model::{Constraint, ConstraintKind, Field};
use crate::utils::JsonUtils;
use regex::Regex;
use serde_json::Value;

/// Check one value against one constraint
pub fn validate_constraint(
    field_name: &str,
    value: &Value,
    constraint: &Constraint,
) -> Option<ConstraintError> {
    let kind = constraint.kind()?;

    let violation = match kind {
        ConstraintKind::Min => check_min(value, &constraint.value),
        ConstraintKind::Max => check_max(value, &constraint.value),
        ConstraintKind::MinLength => check_min_length(value, &constraint.value),
        ConstraintKind::MaxLength => check_max_length(value, &constraint.value),
        ConstraintKind::Pattern => check_pattern(value, &constraint.value),
        ConstraintKind::NotEmpty => check_not_empty(value),
        ConstraintKind::OneOf => check_one_of(value, &constraint.value),
        ConstraintKind::RefExists => None,
    }?;

    Some(ConstraintError {
        field: field_name.to_string(),
        kind,
        message: constraint.message.clone().unwrap_or(violation),
    })
}

/// Check a value against every constraint of a field
pub fn validate_field(field_name: &str, value: &Value, field: &Field) -> Vec<ConstraintError> {
    field
        .constraints
        .iter()
        .filter_map(|constraint| validate_constraint(field_name, value, constraint))
        .collect()
}

fn check_min(value: &Value, bound: &Value) -> Option<String> {
    let (actual, min) = (JsonUtils::as_f64(value)?, JsonUtils::as_f64(bound)?);
    (actual < min).then(|| format!("must be at least {}", bound))
}

fn check_max(value: &Value, bound: &Value) -> Option<String> {
    let (actual, max) = (JsonUtils::as_f64(value)?, JsonUtils::as_f64(bound)?);
    (actual > max).then(|| format!("must be at most {}", bound))
}

fn length_bound(bound: &Value) -> Option<usize> {
    let n = JsonUtils::as_f64(bound)?;
    (n >= 0.0).then(|| n as usize)
}

fn check_min_length(value: &Value, bound: &Value) -> Option<String> {
    let s = value.as_str()?;
    let min = length_bound(bound)?;
    (s.chars().count() < min).then(|| format!("length must be at least {}", min))
}

fn check_max_length(value: &Value, bound: &Value) -> Option<String> {
    let s = value.as_str()?;
    let max = length_bound(bound)?;
    (s.chars().count() > max).then(|| format!("length must be at most {}", max))
}

fn check_pattern(value: &Value, pattern: &Value) -> Option<String> {
    let s = value.as_str()?;
    let pattern = pattern.as_str()?;
    let regex = Regex::new(pattern).ok()?;
    (!regex.is_match(s)).then(|| format!("must match pattern {}", pattern))
}

fn check_not_empty(value: &Value) -> Option<String> {
    let empty = match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };
    empty.then(|| "must not be empty".to_string())
}

fn check_one_of(value: &Value, allowed: &Value) -> Option<String> {
    let allowed = allowed.as_array()?;
    let actual = JsonUtils::canonical_string(value);
    let options: Vec<String> = allowed.iter().map(JsonUtils::canonical_string).collect();
    (!options.contains(&actual)).then(|| format!("must be one of [{}]", options.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn c(kind: ConstraintKind, value: Value) -> Constraint {
        Constraint::new(kind, value)
    }

    #[test]
    fn test_min_max_coerce_numbers() {
        assert!(validate_constraint("age", &json!(17), &c(ConstraintKind::Min, json!(18))).is_some());
        assert!(validate_constraint("age", &json!(18), &c(ConstraintKind::Min, json!(18))).is_none());
        assert!(validate_constraint("age", &json!(18.5), &c(ConstraintKind::Max, json!(18))).is_some());
        assert!(validate_constraint("age", &json!(-1), &c(ConstraintKind::Min, json!(0.5))).is_some());
    }

    #[test]
    fn test_lengths_apply_to_strings_only() {
        let min = c(ConstraintKind::MinLength, json!(3));
        assert!(validate_constraint("name", &json!("ab"), &min).is_some());
        assert!(validate_constraint("name", &json!("abc"), &min).is_none());
        assert!(validate_constraint("name", &json!(12), &min).is_none());

        let max = c(ConstraintKind::MaxLength, json!(2));
        assert!(validate_constraint("name", &json!("héé"), &max).is_some());
    }

    #[test]
    fn test_pattern_skips_invalid_regex_and_non_strings() {
        let bad = c(ConstraintKind::Pattern, json!("(unclosed"));
        assert!(validate_constraint("code", &json!("abc"), &bad).is_none());

        let digits = c(ConstraintKind::Pattern, json!("^[0-9]+$"));
        assert!(validate_constraint("code", &json!(true), &digits).is_none());
        assert!(validate_constraint("code", &json!("12a"), &digits).is_some());
        assert!(validate_constraint("code", &json!("123"), &digits).is_none());
    }

    #[test]
    fn test_one_of_compares_canonical_forms() {
        let allowed = c(ConstraintKind::OneOf, json!(["1", 2, "three"]));
        assert!(validate_constraint("v", &json!(1), &allowed).is_none());
        assert!(validate_constraint("v", &json!("2"), &allowed).is_none());
        assert!(validate_constraint("v", &json!("four"), &allowed).is_some());

        let malformed = c(ConstraintKind::OneOf, json!("a,b"));
        assert!(validate_constraint("v", &json!("z"), &malformed).is_none());
    }

    #[test]
    fn test_not_empty() {
        let rule = c(ConstraintKind::NotEmpty, Value::Null);
        assert!(validate_constraint("v", &json!("  "), &rule).is_some());
        assert!(validate_constraint("v", &json!([]), &rule).is_some());
        assert!(validate_constraint("v", &Value::Null, &rule).is_some());
        assert!(validate_constraint("v", &json!(0), &rule).is_none());
        assert!(validate_constraint("v", &json!("x"), &rule).is_none());
    }

    #[test]
    fn test_ref_exists_and_unknown_kinds_are_noops() {
        let rule = c(ConstraintKind::RefExists, json!("user"));
        assert!(validate_constraint("owner", &json!("missing"), &rule).is_none());

        let unknown = Constraint {
            r#type: "luhn".to_string(),
            value: Value::Null,
            message: None,
        };
        assert!(validate_constraint("card", &json!("1234"), &unknown).is_none());
    }

    #[test]
    fn test_custom_message_replaces_generated_one() {
        let rule = c(ConstraintKind::Min, json!(1)).with_message("need at least one seat");
        let err = validate_constraint("seats", &json!(0), &rule).unwrap();
        assert_eq!(err.field, "seats");
        assert_eq!(err.kind, ConstraintKind::Min);
        assert_eq!(err.message, "need at least one seat");
        assert_eq!(err.to_string(), "seats: need at least one seat");
    }
}
