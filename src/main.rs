use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use axion_api::app::{app, build_state};
use axion_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up JWT_SECRET, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    info!("Starting Axion API in {:?} mode", config.environment);

    let state = build_state(&config).await?;
    let app = app(state, config.server.enable_cors);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Axion API listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
