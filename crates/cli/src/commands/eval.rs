use std::path::Path;

use jsonlogic_eval::Value;

use super::load_json;
use crate::config::Settings;
use crate::error::CliError;
use crate::OutputFormat;

pub(crate) fn cmd_eval(
    rule_path: &Path,
    data_path: Option<&Path>,
    settings: &Settings,
) -> Result<(), CliError> {
    let rule = load_json(rule_path)?;
    let mut data = match data_path {
        Some(path) => load_json(path)?,
        None => Value::Object(Default::default()),
    };
    if settings.parse_dates {
        data = data.with_parsed_dates();
    }

    let evaluation = jsonlogic_eval::evaluate(&rule, &data)?;
    tracing::debug!(trace_nodes = evaluation.trace.len(), "evaluation finished");
    if settings.quiet {
        return Ok(());
    }

    match settings.output {
        OutputFormat::Text => {
            println!("{}", evaluation.result);
            if settings.explain && !evaluation.trace.is_empty() {
                println!();
                println!("{}", evaluation.trace.report());
            }
        }
        OutputFormat::Json => {
            let mut json_output = serde_json::Map::new();
            json_output.insert("result".to_string(), evaluation.result.to_json());
            if settings.explain {
                json_output.insert("trace".to_string(), serde_json::to_value(&evaluation.trace)?);
            }
            println!("{}", serde_json::to_string_pretty(&json_output)?);
        }
    }
    Ok(())
}
