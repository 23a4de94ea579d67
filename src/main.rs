use clap::Parser;
use tracing_subscriber::EnvFilter;

use taskboard_api::cli::{self, Cli};
use taskboard_api::config;
use taskboard_api::is_development;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and friends
    let _ = dotenvy::dotenv();

    let default_level = if is_development!() { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let cli = Cli::parse();

    let config = config::config().clone();
    config.validate()?;
    tracing::info!("Starting Taskboard API in {:?} mode", config.environment);

    if let Err(e) = cli::run(cli, config).await {
        tracing::error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}
