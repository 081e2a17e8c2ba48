//! Optional TOML configuration for the `jsonlogic` CLI.
//!
//! ```toml
//! output = "json"
//! explain = true
//! parse_dates = true
//! ```
//!
//! Every key is optional. Command-line flags take precedence.

use std::path::Path;

use serde::Deserialize;

use crate::error::CliError;
use crate::OutputFormat;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub output: Option<OutputFormat>,
    pub explain: bool,
    pub parse_dates: bool,
}

/// Read and parse a config file from `path`.
pub(crate) fn read_config(path: &Path) -> Result<Config, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content).map_err(|source| CliError::Config {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}

/// Effective options after merging flags over the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Settings {
    pub output: OutputFormat,
    pub quiet: bool,
    pub explain: bool,
    pub parse_dates: bool,
}

impl Settings {
    pub(crate) fn resolve(
        config: &Config,
        output: Option<OutputFormat>,
        quiet: bool,
        explain: bool,
        parse_dates: bool,
    ) -> Self {
        Settings {
            output: output.or(config.output).unwrap_or(OutputFormat::Text),
            quiet,
            explain: explain || config.explain,
            parse_dates: parse_dates || config.parse_dates,
        }
    }
}
