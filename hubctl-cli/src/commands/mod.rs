//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod instance;

use instance::InstanceCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Stack Instance management
    Instance {
        #[command(subcommand)]
        command: InstanceCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module and returns the
/// exit status the process should end with.
pub async fn handle_command(command: Commands, config: &Config) -> Result<i32> {
    match command {
        Commands::Instance { command } => instance::handle_instance_command(command, config).await,
    }
}
