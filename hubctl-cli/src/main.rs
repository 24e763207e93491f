//! Hub CLI
//!
//! Command-line interface for managing Stack Instances on a hub.

mod commands;
mod config;
mod follow;
mod format;
mod kubeconfig;
mod render;

use clap::Parser;
use colored::*;
use commands::{Commands, handle_command};
use config::{Config, DEFAULT_API};
use hubctl_client::ClientError;
use kubeconfig::OutputError;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status when the selector matched nothing
const EXIT_NOT_FOUND: u8 = 2;
/// Exit status when a domain matched several instances
const EXIT_AMBIGUOUS: u8 = 3;
/// Exit status when the hub answered with something unexpected
const EXIT_PROTOCOL: u8 = 4;
/// Exit status when local output could not be written
const EXIT_OUTPUT: u8 = 5;

#[derive(Parser)]
#[command(name = "hub", version)]
#[command(about = "Hub Stack Instance CLI", long_about = None)]
struct Cli {
    /// Hub API URL
    #[arg(long = "api", env = "HUB_API", default_value = DEFAULT_API, global = true)]
    api_url: String,

    /// Hub API token
    #[arg(long, env = "HUB_TOKEN", hide_env_values = true, global = true)]
    api_token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "HUB_TIMEOUT", default_value_t = 30, global = true)]
    timeout: u64,

    /// Print informational messages
    #[arg(short, long, env = "HUB_VERBOSE", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = Config::new(cli.api_url);
    config.api_token = cli.api_token;
    config.timeout = Duration::from_secs(cli.timeout);
    config.verbose = cli.verbose;

    let level = if config.verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("hub={level},hubctl_client={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match config.validate() {
        Ok(()) => handle_command(cli.command, &config).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::from(exit_status(&err))
        }
    }
}

/// Map a failure to the process exit status
fn exit_status(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(client) = cause.downcast_ref::<ClientError>() {
            return match client {
                ClientError::NotFound(_) => EXIT_NOT_FOUND,
                ClientError::Ambiguous { .. } => EXIT_AMBIGUOUS,
                e if e.is_protocol() => EXIT_PROTOCOL,
                _ => 1,
            };
        }
        if cause.downcast_ref::<OutputError>().is_some() {
            return EXIT_OUTPUT;
        }
    }
    1
}
