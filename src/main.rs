use price_series::api::ApiServer;
use price_series::clusters::DuckDbConnector;
use price_series::config::ServerConfig;
use price_series::state::AppState;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    price_series::init_tracing();

    tracing::info!("Starting price server...");

    let config = ServerConfig::from_env();

    // Unreachable clusters are kept as unavailable; startup continues
    let state = Arc::new(AppState::connect(&config, &DuckDbConnector).await);

    let mut server = ApiServer::new(Arc::clone(&state));
    server
        .start(&config.bind_addr())
        .await
        .map_err(anyhow::Error::msg)?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, gracefully stopping...");
    server.stop();

    Ok(())
}
