//! The recognized operators and the operator table.
//!
//! `Operator` is the one list of names both the evaluator and the validator
//! accept. The special forms (`var`, `missing`, `missing_some`, `map`) need
//! the data context and are resolved by the evaluator; every other operator
//! is a pure function of its already-evaluated operands, applied here.

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::coerce::{compare, falsey, to_comparable, to_number, truthy};
use crate::value::{Value, NULL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Var,
    Missing,
    MissingSome,
    Map,
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    Not,
    DoubleNot,
    Modulo,
    And,
    Or,
    Ternary,
    If,
    Log,
    In,
    Cat,
    Add,
    Multiply,
    Subtract,
    Divide,
    Min,
    Max,
    Merge,
    Count,
}

impl Operator {
    pub const ALL: [Operator; 28] = [
        Operator::Var,
        Operator::Missing,
        Operator::MissingSome,
        Operator::Map,
        Operator::Equal,
        Operator::NotEqual,
        Operator::Greater,
        Operator::GreaterOrEqual,
        Operator::Less,
        Operator::LessOrEqual,
        Operator::Not,
        Operator::DoubleNot,
        Operator::Modulo,
        Operator::And,
        Operator::Or,
        Operator::Ternary,
        Operator::If,
        Operator::Log,
        Operator::In,
        Operator::Cat,
        Operator::Add,
        Operator::Multiply,
        Operator::Subtract,
        Operator::Divide,
        Operator::Min,
        Operator::Max,
        Operator::Merge,
        Operator::Count,
    ];

    pub fn from_name(name: &str) -> Option<Operator> {
        Operator::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Operator::Var => "var",
            Operator::Missing => "missing",
            Operator::MissingSome => "missing_some",
            Operator::Map => "map",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Greater => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
            Operator::Not => "!",
            Operator::DoubleNot => "!!",
            Operator::Modulo => "%",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Ternary => "?:",
            Operator::If => "if",
            Operator::Log => "log",
            Operator::In => "in",
            Operator::Cat => "cat",
            Operator::Add => "+",
            Operator::Multiply => "*",
            Operator::Subtract => "-",
            Operator::Divide => "/",
            Operator::Min => "min",
            Operator::Max => "max",
            Operator::Merge => "merge",
            Operator::Count => "count",
        }
    }

    /// Composite operators open their own node in the explanation trace.
    pub fn is_composite(self) -> bool {
        matches!(
            self,
            Operator::And
                | Operator::Or
                | Operator::If
                | Operator::Ternary
                | Operator::Not
                | Operator::DoubleNot
        )
    }

    /// Operators that read the data context and cannot be applied to
    /// operand values alone.
    pub fn is_special_form(self) -> bool {
        matches!(
            self,
            Operator::Var | Operator::Missing | Operator::MissingSome | Operator::Map
        )
    }

    /// Apply a table operator to already-evaluated operands.
    ///
    /// Missing trailing operands read as `null`. Returns `None` for the
    /// special forms.
    pub fn apply(self, args: &[Value]) -> Option<Value> {
        if self.is_special_form() {
            return None;
        }
        let a = arg(args, 0);
        let b = arg(args, 1);
        let result = match self {
            Operator::Var | Operator::Missing | Operator::MissingSome | Operator::Map => {
                unreachable!("special forms return early")
            }
            Operator::Equal => Value::Bool(a == b),
            Operator::NotEqual => Value::Bool(a != b),
            Operator::Greater => Value::Bool(relation(a, b, Ordering::is_gt)),
            Operator::GreaterOrEqual => Value::Bool(relation(a, b, Ordering::is_ge)),
            Operator::Less => Value::Bool(relation(a, b, Ordering::is_lt)),
            Operator::LessOrEqual => match args.get(2) {
                Some(c) if !c.is_null() => {
                    Value::Bool(relation(a, b, Ordering::is_le) && relation(b, c, Ordering::is_le))
                }
                _ => Value::Bool(relation(a, b, Ordering::is_le)),
            },
            Operator::Not => Value::Bool(falsey(a)),
            Operator::DoubleNot => Value::Bool(truthy(a)),
            Operator::Modulo => modulo(a, b),
            Operator::And => args.iter().fold(Value::Bool(true), |acc, arg| {
                if falsey(&acc) {
                    acc
                } else {
                    arg.clone()
                }
            }),
            Operator::Or => args.iter().fold(Value::Bool(false), |acc, arg| {
                if truthy(&acc) {
                    acc
                } else {
                    arg.clone()
                }
            }),
            Operator::Ternary => {
                if truthy(a) {
                    b.clone()
                } else {
                    arg(args, 2).clone()
                }
            }
            Operator::If => if_chain(args),
            Operator::Log => {
                eprintln!("{}", a);
                a.clone()
            }
            Operator::In => Value::Bool(contains(b, a)),
            Operator::Cat => Value::String(
                args.iter()
                    .map(|v| if v.is_null() { String::new() } else { v.to_string() })
                    .collect(),
            ),
            Operator::Add => Value::Float(args.iter().map(to_number).sum()),
            Operator::Multiply => Value::Float(args.iter().map(to_number).product()),
            Operator::Subtract => match args.len() {
                1 => Value::Float(-to_number(a)),
                _ => Value::Float(to_number(a) - to_number(b)),
            },
            Operator::Divide => Value::Float(to_number(a) / to_number(b)),
            Operator::Min => extreme(args, Ordering::Less),
            Operator::Max => extreme(args, Ordering::Greater),
            Operator::Merge => Value::Array(
                args.iter()
                    .flat_map(|arg| match arg {
                        Value::Array(items) => items.clone(),
                        other => vec![other.clone()],
                    })
                    .collect(),
            ),
            Operator::Count => Value::Int(args.iter().filter(|arg| truthy(arg)).count() as i64),
        };
        Some(result)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// ──────────────────────────────────────────────
// Operator helpers
// ──────────────────────────────────────────────

fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&NULL)
}

/// Compare the comparable forms; incomparable pairs never satisfy a relation.
fn relation(a: &Value, b: &Value, accept: fn(Ordering) -> bool) -> bool {
    compare(&to_comparable(a), &to_comparable(b)).is_some_and(accept)
}

/// Floored remainder: the result takes the sign of the divisor.
fn modulo(a: &Value, b: &Value) -> Value {
    if let (Value::Int(x), Value::Int(y)) = (a, b) {
        return match x.checked_rem(*y) {
            Some(r) if r != 0 && (r < 0) != (*y < 0) => Value::Int(r + y),
            Some(r) => Value::Int(r),
            None => Value::Float(f64::NAN),
        };
    }
    let (x, y) = (to_number(a), to_number(b));
    let r = x % y;
    if r != 0.0 && (r < 0.0) != (y < 0.0) {
        Value::Float(r + y)
    } else {
        Value::Float(r)
    }
}

fn if_chain(args: &[Value]) -> Value {
    for pair in args.chunks_exact(2) {
        if truthy(&pair[0]) {
            return pair[1].clone();
        }
    }
    if args.len() % 2 == 1 {
        args[args.len() - 1].clone()
    } else {
        Value::Null
    }
}

fn contains(haystack: &Value, needle: &Value) -> bool {
    match haystack {
        Value::Array(items) => items.contains(needle),
        Value::String(s) => matches!(needle, Value::String(n) if s.contains(n.as_str())),
        Value::Object(map) => matches!(needle, Value::String(k) if map.contains_key(k)),
        _ => false,
    }
}

fn extreme(args: &[Value], wanted: Ordering) -> Value {
    args.iter()
        .map(to_comparable)
        .reduce(|best, candidate| {
            if compare(&candidate, &best) == Some(wanted) {
                candidate
            } else {
                best
            }
        })
        .unwrap_or(Value::Null)
}
