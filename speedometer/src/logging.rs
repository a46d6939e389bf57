//! Logging setup.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` (overridable
//! through `RUST_LOG`), a human-readable layer on stderr and, optionally, a
//! daily-rolling log file written through a non-blocking appender.

use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

/// Log file name prefix inside the log directory.
pub const LOG_FILE_PREFIX: &str = "speedometer.log";

/// How logging should be set up.
#[derive(Debug, Clone, Default)]
pub struct LoggingOptions {
    /// Log at debug level instead of info.
    pub verbose: bool,
    /// Also write logs to a daily file in this directory.
    pub log_dir: Option<PathBuf>,
}

/// Logging could not be installed.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// A global subscriber is already set.
    #[error("Failed to initialize logging: {0}")]
    Init(#[from] TryInitError),
}

/// Keeps the file writer flushing; drop it only at exit.
#[derive(Debug)]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Default filter directive for the given verbosity.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "info,speedometer=debug"
    } else {
        "info"
    }
}

/// Install the global subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(options: &LoggingOptions) -> Result<LoggingGuard, LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(options.verbose)));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, file_guard) = match &options.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(LoggingGuard { _file: file_guard })
}
