//! Truthiness and comparable coercion.
//!
//! Relational operators never compare raw values. Both sides are first
//! coerced: null and false become 0, true becomes 1, every number becomes
//! a float, containers are coerced element-wise, and everything else
//! (strings, dates) keeps its native ordering.

use std::cmp::Ordering;

use crate::value::Value;

/// `null`, `false`, zero, and empty strings/arrays/objects are falsey.
pub fn falsey(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Int(i) => *i == 0,
        Value::Float(f) => *f == 0.0,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Date(_) => false,
    }
}

pub fn truthy(value: &Value) -> bool {
    !falsey(value)
}

/// Coerce a value into its comparable form.
pub fn to_comparable(value: &Value) -> Value {
    match value {
        Value::Null | Value::Bool(false) => Value::Float(0.0),
        Value::Bool(true) => Value::Float(1.0),
        Value::Int(i) => Value::Float(*i as f64),
        Value::Float(f) => Value::Float(*f),
        Value::Array(items) => Value::Array(items.iter().map(to_comparable).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), to_comparable(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Order two comparables. `None` means the pair has no ordering.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (number(a), number(b)) {
        return x.partial_cmp(&y);
    }
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Date(x), Value::Date(y)) => Some(x.cmp(y)),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y) {
                match compare(l, r)? {
                    Ordering::Equal => continue,
                    other => return Some(other),
                }
            }
            Some(x.len().cmp(&y.len()))
        }
        _ => None,
    }
}

/// Numeric conversion for the arithmetic operators.
///
/// Strings contribute their leading decimal prefix (`"3.5kg"` is 3.5,
/// `"abc"` is 0). Containers and dates have no numeric reading and give NaN.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null | Value::Bool(false) => 0.0,
        Value::Bool(true) => 1.0,
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        Value::String(s) => leading_number(s),
        Value::Array(_) | Value::Object(_) | Value::Date(_) => f64::NAN,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn leading_number(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_start = end;
    end = digits_from(end);
    let mut has_digits = end > int_start;

    if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
        end = digits_from(end + 1);
        has_digits = true;
    }
    if !has_digits {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(0.0)
}
