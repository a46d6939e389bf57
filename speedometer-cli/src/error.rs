//! CLI error type.

use speedometer::config::ConfigError;
use speedometer::logging::LoggingError;
use speedometer::source::ReplayError;
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Replay(#[from] ReplayError),

    #[error("{0}")]
    Logging(#[from] LoggingError),

    #[error("No configuration directory found; pass --config")]
    NoConfigDir,

    #[error("Runtime error: {0}")]
    Runtime(String),
}
