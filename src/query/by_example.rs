//! Query-by-example translation.
//!
//! An example is a plain JSON object mirroring document shape. Each key
//! becomes a leaf constraint on that field: scalar values mean exact
//! equality, while an object value selects a different leaf through a
//! `$`-prefixed operator (`{"$word": "token"}` for full-text containment).
//! Multiple keys compose with an implicit `and`.
//!
//! Translation is purely structural. The service is never consulted to
//! validate field names or index types.
//!
//! # Example
//!
//! ```rust
//! use docsearch::query::by_example;
//! use serde_json::json;
//!
//! let constraint = by_example(json!({
//!     "valueKey": "match value",
//!     "wordKey": {"$word": "matchWord1"},
//! }))?;
//! # Ok::<(), docsearch::QueryError>(())
//! ```

use serde_json::{Map, Value};

use crate::error::QueryError;

use super::constraint::{Constraint, FieldValue};

/// Builds the leaf for one recognized example operator.
type OperatorFn = fn(&str, &Value) -> Result<Constraint, QueryError>;

/// Recognized example operators. A new operator is an entry here, not an
/// edit to the translation walk.
const OPERATORS: &[(&str, OperatorFn)] = &[
    ("$value", value_operator),
    ("$word", word_operator),
];

/// Translate an example object into a constraint tree.
///
/// Fails with [`QueryError::InvalidQuery`] when the example is not an
/// object, is empty, uses an unrecognized operator, or carries a value
/// shape (null, array) that has no leaf equivalent.
pub fn by_example(example: Value) -> Result<Constraint, QueryError> {
    let Value::Object(map) = example else {
        return Err(QueryError::invalid("example must be a JSON object"));
    };
    if map.is_empty() {
        return Err(QueryError::invalid("example object has no fields"));
    }

    let mut children = Vec::with_capacity(map.len());
    for (field, spec) in &map {
        children.push(translate_field(field, spec)?);
    }
    Constraint::all_of(children)
}

fn translate_field(field: &str, spec: &Value) -> Result<Constraint, QueryError> {
    match spec {
        Value::Object(inner) => translate_operator(field, inner),
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(Constraint::Value {
            field: field.to_string(),
            literal: scalar_literal(field, spec)?,
        }),
        Value::Null => Err(QueryError::invalid(format!(
            "field '{field}': null is not a supported example value"
        ))),
        Value::Array(_) => Err(QueryError::invalid(format!(
            "field '{field}': arrays are not supported in examples"
        ))),
    }
}

fn translate_operator(field: &str, inner: &Map<String, Value>) -> Result<Constraint, QueryError> {
    let mut entries = inner.iter();
    let Some((op, arg)) = entries.next() else {
        return Err(QueryError::invalid(format!(
            "field '{field}': operator object is empty"
        )));
    };
    if entries.next().is_some() {
        return Err(QueryError::invalid(format!(
            "field '{field}': operator object must contain exactly one key"
        )));
    }

    let Some((_, build)) = OPERATORS.iter().find(|(name, _)| *name == op) else {
        return Err(QueryError::invalid(format!(
            "field '{field}': unrecognized operator '{op}'"
        )));
    };
    build(field, arg)
}

fn value_operator(field: &str, arg: &Value) -> Result<Constraint, QueryError> {
    Ok(Constraint::Value {
        field: field.to_string(),
        literal: scalar_literal(field, arg)?,
    })
}

fn word_operator(field: &str, arg: &Value) -> Result<Constraint, QueryError> {
    match arg {
        Value::String(text) => Ok(Constraint::word(field, text.as_str())),
        _ => Err(QueryError::invalid(format!(
            "field '{field}': $word requires a string argument"
        ))),
    }
}

fn scalar_literal(field: &str, value: &Value) -> Result<FieldValue, QueryError> {
    match value {
        Value::String(s) => Ok(FieldValue::Text(s.clone())),
        Value::Number(n) => n.as_f64().map(FieldValue::Numeric).ok_or_else(|| {
            QueryError::invalid(format!("field '{field}': number is out of range"))
        }),
        Value::Bool(b) => Ok(FieldValue::Boolean(*b)),
        _ => Err(QueryError::invalid(format!(
            "field '{field}': expected a scalar value"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_becomes_value_leaf() {
        let c = by_example(json!({"valueKey": "match value"})).unwrap();
        assert_eq!(
            c,
            Constraint::Value {
                field: "valueKey".to_string(),
                literal: FieldValue::Text("match value".to_string()),
            }
        );
    }

    #[test]
    fn test_word_operator_becomes_word_leaf() {
        let c = by_example(json!({"wordKey": {"$word": "matchWord1"}})).unwrap();
        assert_eq!(
            c,
            Constraint::Word {
                field: "wordKey".to_string(),
                text: "matchWord1".to_string(),
            }
        );
    }

    #[test]
    fn test_value_operator_is_explicit_form() {
        let c = by_example(json!({"valueKey": {"$value": "match value"}})).unwrap();
        assert_eq!(c, by_example(json!({"valueKey": "match value"})).unwrap());
    }

    #[test]
    fn test_numeric_and_boolean_scalars() {
        let c = by_example(json!({"count": 3})).unwrap();
        match c {
            Constraint::Value { literal, .. } => assert_eq!(literal, FieldValue::Numeric(3.0)),
            _ => panic!("Expected Value node"),
        }

        let c = by_example(json!({"active": false})).unwrap();
        match c {
            Constraint::Value { literal, .. } => assert_eq!(literal, FieldValue::Boolean(false)),
            _ => panic!("Expected Value node"),
        }
    }

    #[test]
    fn test_multiple_keys_compose_with_and() {
        let c = by_example(json!({
            "valueKey": "match value",
            "wordKey": {"$word": "matchWord1"},
        }))
        .unwrap();
        match c {
            Constraint::And { children } => {
                assert_eq!(children.len(), 2);
                assert!(children.iter().any(|c| matches!(c, Constraint::Value { .. })));
                assert!(children.iter().any(|c| matches!(c, Constraint::Word { .. })));
            }
            _ => panic!("Expected And node"),
        }
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        let err = by_example(json!({"wordKey": {"$stemmed": "matchWord1"}})).unwrap_err();
        match err {
            QueryError::InvalidQuery { reason } => {
                assert!(reason.contains("$stemmed"), "got: {reason}");
            }
            other => panic!("Expected InvalidQuery, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_object_without_operator_is_rejected() {
        let err = by_example(json!({"address": {"city": "Oslo"}})).unwrap_err();
        assert!(matches!(err, QueryError::InvalidQuery { .. }));
    }

    #[test]
    fn test_null_and_array_values_are_rejected() {
        assert!(by_example(json!({"valueKey": null})).is_err());
        assert!(by_example(json!({"valueKey": ["a", "b"]})).is_err());
    }

    #[test]
    fn test_empty_and_non_object_examples_are_rejected() {
        assert!(by_example(json!({})).is_err());
        assert!(by_example(json!("just a string")).is_err());
        assert!(by_example(json!(42)).is_err());
    }

    #[test]
    fn test_word_operator_requires_string() {
        let err = by_example(json!({"wordKey": {"$word": 7}})).unwrap_err();
        match err {
            QueryError::InvalidQuery { reason } => {
                assert!(reason.contains("$word"), "got: {reason}");
            }
            other => panic!("Expected InvalidQuery, got {other:?}"),
        }
    }
}
