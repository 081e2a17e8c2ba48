//! JSON Logic evaluator -- accepts a rule and a data context, produces a
//! value with an explanation trace.
//!
//! Rules are already-decoded JSON: a single-key mapping from operator name
//! to operands, a sequence, or a primitive. The evaluator resolves `var`
//! references against the data context, applies the fixed operator table,
//! and records how composite operators reached their result. The validator
//! checks rule shape without evaluating.

pub mod coerce;
pub mod error;
pub mod evaluator;
pub mod operator;
pub mod trace;
pub mod validate;
pub mod value;
pub mod vars;

pub use error::EvalError;
pub use evaluator::{evaluate, Evaluation};
pub use operator::Operator;
pub use trace::{DataPoint, Entry, NodeId, Trace, TraceNode};
pub use validate::is_valid;
pub use value::Value;
pub use vars::{extract_variable_names, fetch_variable_values};

/// Evaluate a rule and return only its result.
pub fn apply(rule: &Value, data: &Value) -> Result<Value, EvalError> {
    evaluate(rule, data).map(|evaluation| evaluation.result)
}

/// Evaluate JSON directly.
///
/// The result converts back to JSON; non-finite numbers become `null`.
pub fn apply_json(
    rule: &serde_json::Value,
    data: &serde_json::Value,
) -> Result<serde_json::Value, EvalError> {
    apply(&Value::from(rule), &Value::from(data)).map(|result| result.to_json())
}

// ──────────────────────────────────────────────
// Integration tests
// ──────────────────────────────────────────────
