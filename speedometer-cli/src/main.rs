//! Speedometer CLI - Command-line interface
//!
//! Replays recorded receiver traffic through the speedometer engine and
//! manages its configuration file.

mod commands;
mod error;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use error::CliError;

#[derive(Parser)]
#[command(name = "speedometer")]
#[command(about = "GPS speedometer with session statistics", long_about = None)]
#[command(version = speedometer::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded drive and show the live readout
    Replay {
        /// JSON-lines recording of receiver callbacks
        file: PathBuf,

        /// Configuration file (defaults to the per-user config.ini)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Log at debug level
        #[arg(short, long)]
        verbose: bool,

        /// Also write logs to a daily file in this directory
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Replay {
            file,
            config,
            verbose,
            log_dir,
        } => commands::replay::run(commands::replay::ReplayArgs {
            file,
            config,
            verbose,
            log_dir,
        }),
        Commands::Config(command) => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}

impl CliError {
    /// Print the error and exit with a failure status.
    fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        process::exit(1);
    }
}
