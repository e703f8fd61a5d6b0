use std::net::SocketAddr;

use anyhow::Result;
use billing_service::{api, config::AppConfig, metrics_server, observability, seed};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    let store = seed::build_store(&cfg.seed).await?;
    let app = api::router(api::AppState::from_config(&cfg, store));

    let addr: SocketAddr = cfg
        .server
        .bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid server.bind_addr: {e}"))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "billing service listening");

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
