//! Evaluation errors.

/// Errors that abort an evaluation.
///
/// Type mismatches during variable resolution and numeric domain errors
/// are not errors: they resolve to `null`, the default, NaN, or infinity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// A rule mapping whose key is not a recognized operator.
    #[error("unrecognized operator: {operator}")]
    UnrecognizedOperator { operator: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_the_operator() {
        let err = EvalError::UnrecognizedOperator {
            operator: "bar".to_string(),
        };
        assert_eq!(err.to_string(), "unrecognized operator: bar");
    }
}
