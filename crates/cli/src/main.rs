mod commands;
mod config;
mod error;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use tracing::Level;

use crate::config::Settings;
use crate::error::CliError;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// JSON Logic rule evaluator.
#[derive(Parser)]
#[command(name = "jsonlogic", version, about = "JSON Logic rule evaluator")]
struct Cli {
    /// Output format (text or json) [default: text]
    #[arg(long, global = true, value_enum)]
    output: Option<OutputFormat>,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read YYYY-MM-DD strings in data files as dates
    #[arg(long, global = true)]
    parse_dates: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a rule against a data context
    Eval {
        /// Path to the rule JSON file
        rule: PathBuf,
        /// Path to the data JSON file (defaults to an empty object)
        #[arg(long)]
        data: Option<PathBuf>,
        /// Print the explanation trace after the result
        #[arg(long)]
        explain: bool,
    },

    /// Check that a rule is well formed without evaluating it
    Validate {
        /// Path to the rule JSON file
        rule: PathBuf,
    },

    /// List the variables a rule reads
    Vars {
        /// Path to the rule JSON file
        rule: PathBuf,
    },

    /// List the values a rule compares a variable against
    Values {
        /// Path to the rule JSON file
        rule: PathBuf,
        /// Variable name (parsed as JSON when possible, e.g. `1`)
        name: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = match cli.config.as_deref().map(config::read_config).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            report_error(&e.to_string(), cli.output.unwrap_or(OutputFormat::Text), cli.quiet);
            process::exit(1);
        }
    };

    let explain = matches!(cli.command, Commands::Eval { explain: true, .. });
    let settings = Settings::resolve(&config, cli.output, cli.quiet, explain, cli.parse_dates);
    tracing::debug!(?settings, "resolved settings");

    match run(cli.command, &settings) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            report_error(&e.to_string(), settings.output, settings.quiet);
            process::exit(1);
        }
    }
}

/// Dispatch a subcommand. `Ok(false)` means the command ran but reported
/// a negative outcome.
fn run(command: Commands, settings: &Settings) -> Result<bool, CliError> {
    match command {
        Commands::Eval { rule, data, .. } => {
            commands::eval::cmd_eval(&rule, data.as_deref(), settings).map(|()| true)
        }
        Commands::Validate { rule } => commands::validate::cmd_validate(&rule, settings),
        Commands::Vars { rule } => commands::vars::cmd_vars(&rule, settings).map(|()| true),
        Commands::Values { rule, name } => {
            commands::vars::cmd_values(&rule, &name, settings).map(|()| true)
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
