//! Recursive rule evaluation.
//!
//! A rule is a mapping from an operator name to its operands, a sequence, or
//! a primitive. Only mappings are interpreted; everything else is a literal.
//! Operands are evaluated eagerly, left to right, before the operator runs,
//! so `and`, `or`, and `if` never skip the side effects of an operand.

use crate::coerce::to_number;
use crate::error::EvalError;
use crate::operator::Operator;
use crate::trace::{DataPoint, Trace, TraceBuilder};
use crate::value::{Value, NULL};

/// Result of one top-level evaluation and its explanation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub result: Value,
    pub trace: Trace,
}

/// Evaluate `rule` against `data`, building a fresh explanation trace.
pub fn evaluate(rule: &Value, data: &Value) -> Result<Evaluation, EvalError> {
    let mut trace = TraceBuilder::new();
    let result = eval_rule(rule, data, &mut trace)?;
    Ok(Evaluation {
        result,
        trace: trace.finish(),
    })
}

fn eval_rule(rule: &Value, data: &Value, trace: &mut TraceBuilder) -> Result<Value, EvalError> {
    let Value::Object(map) = rule else {
        return Ok(rule.clone());
    };
    let Some((name, operand)) = map.first() else {
        return Ok(rule.clone());
    };
    let operator = Operator::from_name(name).ok_or_else(|| EvalError::UnrecognizedOperator {
        operator: name.clone(),
    })?;
    tracing::trace!(%operator, "evaluating");
    trace.enter(operator);

    if operator == Operator::Map {
        return eval_map(operand, data, trace);
    }

    let values = operands(operand)
        .iter()
        .map(|sub| eval_rule(sub, data, trace))
        .collect::<Result<Vec<_>, _>>()?;

    match operator {
        Operator::Var => Ok(var_value(data, arg(&values, 0), values.get(1))),
        Operator::Missing => Ok(missing(data, &values)),
        Operator::MissingSome => Ok(missing_some(data, &values)),
        _ => {
            let result = operator.apply(&values).unwrap_or(Value::Null);
            commit(trace, operator, operand, data, &result);
            Ok(result)
        }
    }
}

/// The operand list of a rule; a lone operand is a one-element list.
fn operands(operand: &Value) -> &[Value] {
    match operand {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    }
}

fn arg(values: &[Value], index: usize) -> &Value {
    values.get(index).unwrap_or(&NULL)
}

fn eval_map(operand: &Value, data: &Value, trace: &mut TraceBuilder) -> Result<Value, EvalError> {
    let args = operands(operand);
    let items = eval_rule(arg(args, 0), data, trace)?;
    let Value::Array(items) = items else {
        return Ok(Value::Array(Vec::new()));
    };
    let mapper = arg(args, 1);
    items
        .iter()
        .map(|item| eval_rule(mapper, item, trace))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn commit(trace: &mut TraceBuilder, operator: Operator, operand: &Value, data: &Value, result: &Value) {
    if operator.is_composite() {
        trace.commit_composite(result);
        return;
    }
    let variable = implicated_variable(operand);
    let current = variable
        .as_ref()
        .and_then(|name| lookup(data, name))
        .cloned()
        .unwrap_or(Value::Null);
    trace.record(DataPoint {
        variable,
        operator,
        expected: operand.clone(),
        current,
        result: result.clone(),
    });
}

/// Name of the variable a non-composite operator tests: the middle operand
/// of a three-operand range check, otherwise the first operand.
fn implicated_variable(operand: &Value) -> Option<Value> {
    let args = operand.as_array()?;
    let index = if args.len() == 3 { 1 } else { 0 };
    let name = args.get(index)?.as_object()?.get("var")?;
    let name = match name {
        Value::Array(parts) => parts.first()?,
        other => other,
    };
    if name.is_null() {
        None
    } else {
        Some(name.clone())
    }
}

// ──────────────────────────────────────────────
// Variable resolution
// ──────────────────────────────────────────────

/// Resolve a dotted variable path against `data`.
///
/// `null` and the empty string name the whole context. Mappings are entered
/// by key, sequences by numeric index; any other segment resolves to
/// nothing.
pub fn lookup<'a>(data: &'a Value, name: &Value) -> Option<&'a Value> {
    let path = match name {
        Value::Null => return Some(data),
        Value::String(s) => s.clone(),
        Value::Float(f) if f.fract() == 0.0 && f.is_finite() => format!("{}", *f as i64),
        other => other.to_string(),
    };
    if path.is_empty() {
        return Some(data);
    }
    let found = path.split('.').try_fold(data, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    });
    tracing::trace!(path = %path, found = found.is_some(), "resolved variable");
    found
}

/// Value of a variable, falling back to `default` when it resolves to null.
pub fn var_value(data: &Value, name: &Value, default: Option<&Value>) -> Value {
    match lookup(data, name) {
        Some(value) if !value.is_null() => value.clone(),
        _ => default.cloned().unwrap_or(Value::Null),
    }
}

fn is_missing(data: &Value, name: &Value) -> bool {
    lookup(data, name).map_or(true, Value::is_null)
}

fn missing(data: &Value, values: &[Value]) -> Value {
    Value::Array(
        values
            .iter()
            .filter(|name| is_missing(data, name))
            .cloned()
            .collect(),
    )
}

fn missing_some(data: &Value, values: &[Value]) -> Value {
    let min_required = to_number(arg(values, 0));
    if min_required < 1.0 {
        return Value::Array(Vec::new());
    }
    let names = operands(arg(values, 1));
    let (absent, present): (Vec<&Value>, Vec<&Value>) =
        names.iter().partition(|name| is_missing(data, name));
    if present.len() as f64 >= min_required {
        Value::Array(Vec::new())
    } else {
        Value::Array(absent.into_iter().cloned().collect())
    }
}
