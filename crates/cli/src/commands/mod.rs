pub(crate) mod eval;
pub(crate) mod validate;
pub(crate) mod vars;

use std::path::Path;

use jsonlogic_eval::Value;

use crate::error::CliError;

/// Read and parse a JSON file into a runtime value.
pub(crate) fn load_json(path: &Path) -> Result<Value, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let json: serde_json::Value =
        serde_json::from_str(&text).map_err(|source| CliError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(path = %path.display(), "loaded JSON");
    Ok(Value::from(json))
}

/// Print a list of values, one per line or as a JSON array.
pub(crate) fn print_values(values: &[Value], output: crate::OutputFormat) -> Result<(), CliError> {
    match output {
        crate::OutputFormat::Text => {
            for value in values {
                println!("{}", value);
            }
        }
        crate::OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(values)?);
        }
    }
    Ok(())
}
