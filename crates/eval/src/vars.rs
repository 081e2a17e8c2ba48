//! Rule introspection: which variables a rule reads and which values it
//! compares them against.

use crate::value::Value;

/// Every value found under a `var` key anywhere in `rule`, in encounter
/// order, duplicates included.
pub fn extract_variable_names(rule: &Value) -> Vec<Value> {
    let mut names = Vec::new();
    collect_names(rule, &mut names);
    names
}

fn collect_names(rule: &Value, names: &mut Vec<Value>) {
    match rule {
        Value::Object(map) => {
            for (key, value) in map {
                if key == "var" {
                    names.push(value.clone());
                } else {
                    collect_names(value, names);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_names(item, names);
            }
        }
        _ => {}
    }
}

/// Values paired with `name` in operand lists of the form
/// `[{"var": name}, value, ...]`, anywhere in `rule`.
pub fn fetch_variable_values(rule: &Value, name: &Value) -> Vec<Value> {
    let mut values = Vec::new();
    collect_values(rule, name, &mut values);
    values
}

fn collect_values(rule: &Value, name: &Value, values: &mut Vec<Value>) {
    match rule {
        Value::Array(items) => {
            if items.first().is_some_and(|first| references(first, name)) {
                values.push(items.get(1).cloned().unwrap_or(Value::Null));
                return;
            }
            for item in items {
                collect_values(item, name, values);
            }
        }
        Value::Object(map) => {
            for value in map.values() {
                collect_values(value, name, values);
            }
        }
        _ => {}
    }
}

fn references(rule: &Value, name: &Value) -> bool {
    rule.as_object()
        .and_then(|map| map.get("var"))
        .is_some_and(|var| var == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(json: serde_json::Value) -> Vec<Value> {
        match Value::from(json) {
            Value::Array(items) => items,
            other => vec![other],
        }
    }

    #[test]
    fn extracts_from_mapping() {
        let rule = Value::from(json!({">": [{"var": "felony_count"}, 5]}));
        assert_eq!(extract_variable_names(&rule), values(json!(["felony_count"])));
    }

    #[test]
    fn extracts_from_sequence_in_order() {
        let rule = Value::from(json!([
            {">": [{"var": "felony_count"}, 5]},
            {"in": [{"var": "severe_felony"}, ["Murder", "Manslaughter"]]}
        ]));
        assert_eq!(
            extract_variable_names(&rule),
            values(json!(["felony_count", "severe_felony"]))
        );
    }

    #[test]
    fn keeps_duplicates_and_raw_forms() {
        let rule = Value::from(json!({"and": [
            {"==": [{"var": "a"}, 1]},
            {"!=": [{"var": ["a", 0]}, 2]}
        ]}));
        assert_eq!(extract_variable_names(&rule), values(json!(["a", ["a", 0]])));
    }

    #[test]
    fn ignores_unknown_keys() {
        let rule = Value::from(json!([
            {">": [{"baz": "felony_count"}, 5]},
            {"in": [{"tar": "severe_felony"}, ["Murder"]]}
        ]));
        assert!(extract_variable_names(&rule).is_empty());
    }

    #[test]
    fn fetches_single_value() {
        let rule = Value::from(json!([
            {">": [{"var": "felony_count"}, 5]},
            {"in": [{"var": "severe_felony"}, ["Murder", "Manslaughter"]]}
        ]));
        assert_eq!(
            fetch_variable_values(&rule, &Value::from("felony_count")),
            vec![Value::Int(5)]
        );
    }

    #[test]
    fn fetches_every_occurrence() {
        let rule = Value::from(json!([
            {">": [{"var": "felony_count"}, 5]},
            {"<": [{"var": "felony_count"}, 10]}
        ]));
        assert_eq!(
            fetch_variable_values(&rule, &Value::from("felony_count")),
            vec![Value::Int(5), Value::Int(10)]
        );
    }

    #[test]
    fn fetch_of_absent_variable_is_empty() {
        let rule = Value::from(json!([{">": [{"var": "felony_count"}, 5]}]));
        assert!(fetch_variable_values(&rule, &Value::from("gender")).is_empty());
    }

    #[test]
    fn fetch_pairs_lone_reference_with_null() {
        let rule = Value::from(json!({"!!": [{"var": "flag"}]}));
        assert_eq!(fetch_variable_values(&rule, &Value::from("flag")), vec![Value::Null]);
    }

    #[test]
    fn extracts_in_written_key_order() {
        let rule = Value::from(json!({"or": [{"var": "x"}], "and": [{"var": "y"}]}));
        assert_eq!(extract_variable_names(&rule), values(json!(["x", "y"])));
    }
}
