//! Runtime values and JSON conversion.
//!
//! Rules and data contexts arrive as decoded JSON. The evaluator works on
//! `Value`, which mirrors JSON but keeps integers and floats apart and can
//! carry calendar dates, an opaque type with its own native ordering.
//!
//! Objects keep their keys in the order they were written: the first key of
//! a rule names its operator.

use std::fmt;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use time::macros::format_description;

pub(crate) static NULL: Value = Value::Null;

// ──────────────────────────────────────────────
// Runtime values
// ──────────────────────────────────────────────

/// A rule, a data context, or an evaluation result.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
    Date(time::Date),
}

/// Native equality: integers and floats compare numerically, containers
/// compare structurally, and no other types are ever equal to each other.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Convert back to JSON.
    ///
    /// Dates become `YYYY-MM-DD` strings. NaN and the infinities have no
    /// JSON representation and become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Date(d) => serde_json::Value::String(d.to_string()),
        }
    }

    /// Recursively replace `YYYY-MM-DD` strings with date values.
    pub fn with_parsed_dates(self) -> Value {
        match self {
            Value::String(s) => match parse_date(&s) {
                Some(d) => Value::Date(d),
                None => Value::String(s),
            },
            Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::with_parsed_dates).collect())
            }
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, v.with_parsed_dates()))
                    .collect(),
            ),
            other => other,
        }
    }
}

/// Parse an ISO-8601 calendar date (`2023-11-21`).
pub fn parse_date(s: &str) -> Option<time::Date> {
    time::Date::parse(s, format_description!("[year]-[month]-[day]")).ok()
}

// ──────────────────────────────────────────────
// Conversions
// ──────────────────────────────────────────────

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from(&json)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

// ──────────────────────────────────────────────
// Serialization and display
// ──────────────────────────────────────────────

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Value::Float(_) => serializer.serialize_unit(),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Value::Date(d) => serializer.collect_str(d),
        }
    }
}

/// Display form used by `cat`, `log`, and explanation reports.
///
/// Strings render without quotes, containers as compact JSON, integral
/// floats keep their `.0` suffix.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write_float(f, *x),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(_) | Value::Object(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                write!(f, "{}", json)
            }
            Value::Date(d) => write!(f, "{}", d),
        }
    }
}

fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        write!(f, "NaN")
    } else if x.is_infinite() {
        write!(f, "{}", if x > 0.0 { "Infinity" } else { "-Infinity" })
    } else if x.fract() == 0.0 && x.abs() < 1e16 {
        write!(f, "{:.1}", x)
    } else {
        write!(f, "{}", x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_integers_stay_integers() {
        assert!(matches!(Value::from(json!(7)), Value::Int(7)));
        assert!(matches!(Value::from(json!(7.5)), Value::Float(_)));
    }

    #[test]
    fn int_and_float_are_natively_equal() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Int(1), Value::Bool(true));
        assert_ne!(Value::Bool(false), Value::Null);
        assert_eq!(Value::from(json!([1, {"a": 2}])), Value::from(json!([1.0, {"a": 2.0}])));
    }

    #[test]
    fn non_finite_floats_become_null_json() {
        assert_eq!(Value::Float(f64::NAN).to_json(), json!(null));
        assert_eq!(Value::Float(f64::INFINITY).to_json(), json!(null));
        assert_eq!(Value::Float(2.5).to_json(), json!(2.5));
    }

    #[test]
    fn objects_keep_written_key_order() {
        let v = Value::from(json!({"or": [true], "and": [false], "==": [1, 1]}));
        let keys: Vec<_> = v.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["or", "and", "=="]);
        assert_eq!(v.to_string(), r#"{"or":[true],"and":[false],"==":[1,1]}"#);
    }

    #[test]
    fn object_equality_ignores_key_order() {
        assert_eq!(Value::from(json!({"a": 1, "b": 2})), Value::from(json!({"b": 2, "a": 1})));
    }

    #[test]
    fn display_forms() {
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
        assert_eq!(Value::Float(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Value::from("cola").to_string(), "cola");
        assert_eq!(Value::from(json!(["a", 1])).to_string(), r#"["a",1]"#);
    }

    #[test]
    fn dates_parse_and_render_iso() {
        let v = Value::from(json!({"when": "2023-11-21", "name": "x-1"})).with_parsed_dates();
        let map = v.as_object().unwrap();
        assert!(matches!(map["when"], Value::Date(_)));
        assert!(matches!(map["name"], Value::String(_)));
        assert_eq!(v.to_json(), json!({"when": "2023-11-21", "name": "x-1"}));
    }
}
