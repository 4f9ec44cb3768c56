//! mathsproutd - the math practice HTTP daemon.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::{AppState, Config, routes};
use storage::repository::Storage;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let storage = match &config.database_url {
        Some(url) => {
            info!(url = %url, "using sqlite storage");
            Storage::sqlite(url).await?
        }
        None => {
            info!("no database configured, using in-memory storage");
            Storage::in_memory()
        }
    };

    let state = Arc::new(AppState::new(storage));
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("listening on http://{}", config.addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown handler");
    }
}
