use anyhow::Context;
use clap::Args;

use crate::config::AppConfig;
use crate::database::open_store;
use crate::state::AppState;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Interface to bind (overrides SERVER_HOST)")]
    pub host: Option<String>,

    #[arg(long, help = "Port to bind (overrides SERVER_PORT)")]
    pub port: Option<u16>,
}

pub async fn handle(args: ServeArgs, mut config: AppConfig) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let store = open_store(&config).await.context("failed to open record store")?;
    let bind_addr = config.bind_addr();
    let app = crate::app(AppState::new(config, store));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Taskboard API listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
