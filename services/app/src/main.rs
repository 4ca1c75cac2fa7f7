use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use common::ClientConfig;

use crate::{cli::Cli, commands::App};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing, logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.api_base_url = api_url.trim_end_matches('/').to_string();
    }
    info!("Using API at {}", config.api_base_url);

    let app = App::bootstrap(&config)?;
    app.run(cli.command).await
}
