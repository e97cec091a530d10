mod card;
mod config;
mod dispatch;
mod error;
mod lotto;
mod marker;
mod platform;
mod registry;
mod scheduler;
mod server;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::scheduler::{jobs, Scheduler};
use crate::server::AppState;
use crate::storage::{FileStore, Store};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,linerelay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration from environment")?;

    info!("Configuration loaded successfully");
    info!("  Port: {}", config.server.port);
    info!("  Data dir: {}", config.server.data_dir.display());
    info!(
        "  Lottery API: {}",
        config.lotto.base_url.as_deref().unwrap_or("(not configured)")
    );

    // Create shared state over the file-backed store
    let store: Arc<dyn Store> = Arc::new(FileStore::new(config.server.data_dir.clone()));
    let state = Arc::new(AppState::new(config, store));

    // Register and start the broadcast schedule
    let scheduler = Scheduler::new().await?;
    jobs::register_jobs(&scheduler, state.clone()).await?;
    scheduler.start().await?;

    // Run the HTTP surface (webhook receiver + operational endpoints)
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.server.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, server::router(state))
        .await
        .context("HTTP server terminated")?;

    Ok(())
}
