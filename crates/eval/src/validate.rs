//! Structural rule validation.
//!
//! Validation never evaluates anything and never fails; it only answers
//! whether a value has the shape of a rule.

use crate::operator::Operator;
use crate::value::Value;

/// Whether `rule` is a well-formed rule.
///
/// Every key of a mapping must name a recognized operator and every value
/// must itself be valid. A mapping with several recognized keys passes even
/// though evaluation only reads the first one.
pub fn is_valid(rule: &Value) -> bool {
    match rule {
        Value::Object(map) => map
            .iter()
            .all(|(key, value)| Operator::from_name(key).is_some() && is_valid(value)),
        Value::Array(items) => items
            .iter()
            .all(|item| is_valid(item) || is_variable(item) || is_primitive(item)),
        other => is_primitive(other),
    }
}

/// `{"var": name}` where the name is a string, a number, or null.
fn is_variable(value: &Value) -> bool {
    matches!(
        value.as_object().and_then(|map| map.get("var")),
        Some(Value::String(_) | Value::Int(_) | Value::Float(_) | Value::Null)
    )
}

fn is_primitive(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid(rule: serde_json::Value) -> bool {
        is_valid(&Value::from(rule))
    }

    #[test]
    fn operator_with_primitive_operands() {
        assert!(valid(json!({"==": [{"var": "temp"}, 3]})));
    }

    #[test]
    fn operator_with_array_operand() {
        assert!(valid(json!({"in": [{"var": "temp"}, [3, 4]]})));
    }

    #[test]
    fn nested_operator_with_false() {
        assert!(valid(json!({"and": [{"==": [{"var": "green_card"}, false]}]})));
    }

    #[test]
    fn mapping_operand_is_invalid() {
        assert!(!valid(json!({"==": [{"var": "temp"}, {"x": "y"}]})));
    }

    #[test]
    fn unknown_operator_is_invalid() {
        assert!(!valid(json!({"==!!": [{"var": "temp"}, 3]})));
        assert!(!valid(json!({"bar": "temp"})));
    }

    #[test]
    fn primitives_are_valid() {
        assert!(valid(json!("test")));
        assert!(valid(json!(null)));
        assert!(valid(json!(4.5)));
        assert!(valid(json!([1, "a", null])));
    }

    #[test]
    fn special_forms_are_recognized() {
        assert!(valid(json!({"missing_some": [1, ["a", "b"]]})));
        assert!(valid(json!({"map": [{"var": "xs"}, {"*": [{"var": ""}, 2]}]})));
        assert!(valid(json!({"!": {"var": "a"}})));
    }

    #[test]
    fn variable_references_in_sequences() {
        assert!(valid(json!([{"var": 0}, {"var": null}])));
        assert!(!valid(json!([{"var": {"x": 1}}])));
    }

    #[test]
    fn multi_key_mapping_is_permissively_accepted() {
        assert!(valid(json!({"==": [1, 1], "and": [true]})));
        assert!(!valid(json!({"==": [1, 1], "nope": [true]})));
    }
}
