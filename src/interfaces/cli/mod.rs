//! CLI interface module
//!
//! Offline commands that talk to the database directly.

pub mod commands;

use std::fmt;
use std::sync::Arc;

use crate::cli::{Commands, ConfigCommands};
use crate::errors::VisitorCounterError;
use crate::storage::StorageFactory;
use crate::visitor::{VisitStore, VisitorCounter};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    CommandError(String),
}

impl CliError {
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<VisitorCounterError> for CliError {
    fn from(err: VisitorCounterError) -> Self {
        CliError::StorageError(err.to_string())
    }
}

async fn open_counter() -> Result<VisitorCounter, CliError> {
    let storage = StorageFactory::create().await?;
    let store: Arc<dyn VisitStore> = storage;
    Ok(VisitorCounter::new(store))
}

/// Run a CLI command from clap-parsed input
///
/// `Serve` is handled by the binary and is rejected here.
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    match cmd {
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => commands::config_generate(output_path, force),
        Commands::Stats { json } => commands::show_stats(&open_counter().await?, json).await,
        Commands::Record => commands::record_visit(&open_counter().await?).await,
        Commands::Serve => Err(CliError::CommandError(
            "serve is not a CLI command".to_string(),
        )),
    }
}
