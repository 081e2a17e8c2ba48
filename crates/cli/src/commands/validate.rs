use std::path::Path;

use super::load_json;
use crate::config::Settings;
use crate::error::CliError;
use crate::{report_error, OutputFormat};

/// Returns whether the rule is valid; an invalid rule is not an I/O error
/// but still exits non-zero.
pub(crate) fn cmd_validate(rule_path: &Path, settings: &Settings) -> Result<bool, CliError> {
    let rule = load_json(rule_path)?;
    let valid = jsonlogic_eval::is_valid(&rule);

    if valid {
        if !settings.quiet {
            match settings.output {
                OutputFormat::Text => println!("valid"),
                OutputFormat::Json => println!("{}", serde_json::json!({ "valid": true })),
            }
        }
    } else {
        match settings.output {
            OutputFormat::Text => {
                let msg = format!("error: {} is not a valid rule", rule_path.display());
                report_error(&msg, settings.output, settings.quiet);
            }
            OutputFormat::Json => {
                if !settings.quiet {
                    println!("{}", serde_json::json!({ "valid": false }));
                }
            }
        }
    }
    Ok(valid)
}
