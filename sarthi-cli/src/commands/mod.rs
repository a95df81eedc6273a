//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod diagnosis;
mod scan;

pub use diagnosis::DiagnosisCommands;
pub use scan::ScanArgs;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Scan a plant image and wait for the diagnosis
    Scan(ScanArgs),
    /// Inspect past diagnoses
    Diagnosis {
        #[command(subcommand)]
        command: DiagnosisCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Scan(args) => scan::handle_scan_command(args, config).await,
        Commands::Diagnosis { command } => {
            diagnosis::handle_diagnosis_command(command, config).await
        }
    }
}
