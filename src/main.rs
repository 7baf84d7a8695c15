mod api_doc;
mod app;
mod config;
mod error;
mod extract;
mod handlers;
mod keys;
mod models;
mod routes;
mod state;
mod store;

use anyhow::Context;
use config::{Config, StorageBackend};
use state::AppState;
use std::sync::Arc;
use store::SpannerStore;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    tracing::info!("req-validate-api starting");

    let config = Config::from_env()?;
    config.log_startup();

    let state = match (config.storage_backend, &config.spanner) {
        (StorageBackend::Spanner, Some(spanner)) => {
            AppState::new(Arc::new(SpannerStore::from_config(spanner).await?))
        }
        (StorageBackend::Spanner, None) => {
            anyhow::bail!("Spanner backend selected without Spanner configuration")
        }
        (StorageBackend::Memory, _) => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            AppState::in_memory()
        }
    };

    let app = app::router(state);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("req-validate-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
