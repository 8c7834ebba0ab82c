//! carchain API server entry point.

use anyhow::{Context, Result};
use carchain_chain::{Ledger, SharedLedger};
use carchain_server::{router, AppState, ServerConfig};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::parse();
    let ledger_config = config
        .ledger_config()
        .context("invalid ledger configuration")?;

    info!(
        difficulty = ledger_config.pow.difficulty_prefix(),
        policy = ?ledger_config.registration_policy,
        "initializing ledger"
    );

    let ledger = SharedLedger::new(Ledger::new(ledger_config));
    let app = router(AppState::new(ledger, config.mining_timeout()));

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "CarChain API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
