use std::path::Path;

use jsonlogic_eval::Value;

use super::{load_json, print_values};
use crate::config::Settings;
use crate::error::CliError;

pub(crate) fn cmd_vars(rule_path: &Path, settings: &Settings) -> Result<(), CliError> {
    let rule = load_json(rule_path)?;
    let names = jsonlogic_eval::extract_variable_names(&rule);
    if settings.quiet {
        return Ok(());
    }
    print_values(&names, settings.output)
}

pub(crate) fn cmd_values(rule_path: &Path, name: &str, settings: &Settings) -> Result<(), CliError> {
    let rule = load_json(rule_path)?;
    let values = jsonlogic_eval::fetch_variable_values(&rule, &parse_name(name));
    if settings.quiet {
        return Ok(());
    }
    print_values(&values, settings.output)
}

/// Variable names given on the command line are JSON when they parse as
/// JSON (`1`, `null`), plain strings otherwise.
fn parse_name(raw: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(raw)
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(raw))
}
