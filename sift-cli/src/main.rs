//! Sift CLI
//!
//! Command-line interface for the Sift review analysis server.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Ask questions about product reviews", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(long, env = "SIFT_SERVER_URL", default_value = "http://localhost:3000")]
    server_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server_url,
    };

    handle_command(cli.command, &config).await
}
