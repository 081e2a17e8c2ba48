use std::path::PathBuf;

/// Failures surfaced by CLI subcommands.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("error reading file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error: invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("error: invalid config in {}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("error: {0}")]
    Eval(#[from] jsonlogic_eval::EvalError),

    #[error("error: could not serialize output: {0}")]
    Output(#[from] serde_json::Error),
}
