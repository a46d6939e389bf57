//! Configuration CLI commands.
//!
//! `config show` prints the effective settings as INI, `config path` prints
//! where the settings file is looked up.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use speedometer::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show {
        /// Configuration file (defaults to the per-user config.ini)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show { config } => run_show(config.as_deref()),
        ConfigCommands::Path => run_path(),
    }
}

/// Load the config file at `explicit`, or the default location.
///
/// A missing file yields defaults; a malformed one is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<ConfigFile, CliError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match config_file_path() {
            Some(path) => path,
            None => return Ok(ConfigFile::default()),
        },
    };
    Ok(ConfigFile::load_or_default(&path)?)
}

fn run_show(config: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config)?;
    print!("{}", config.to_ini_string());
    Ok(())
}

fn run_path() -> Result<(), CliError> {
    let path = config_file_path().ok_or(CliError::NoConfigDir)?;
    println!("{}", path.display());
    Ok(())
}
