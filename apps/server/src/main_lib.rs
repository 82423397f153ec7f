//! Headless trade journal runtime: local store, sync engine and the HTTP surface.

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod state;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

pub use config::ServerConfig;
pub use state::AppState;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub async fn run(config: ServerConfig) -> Result<()> {
    let state = state::build_state(&config)?;
    let app = api::app_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Cannot bind {}", config.listen_addr))?;
    tracing::info!("Listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
}
