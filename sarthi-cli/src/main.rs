//! Sarthi CLI
//!
//! Command-line front end for the Sarthi advisory backend: scan plant images
//! and follow their diagnosis, or browse past diagnoses.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sarthi")]
#[command(about = "Sarthi crop advisory CLI", long_about = None)]
struct Cli {
    /// Sarthi API base URL
    #[arg(
        long,
        env = "SARTHI_API_URL",
        default_value = "http://localhost:5000/api/v1"
    )]
    api_url: String,

    /// Bearer token for authenticated endpoints
    #[arg(long, env = "SARTHI_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sarthi_cli=info,sarthi_poller=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        api_url: cli.api_url,
        token: cli.token,
    };

    handle_command(cli.command, &config).await
}
