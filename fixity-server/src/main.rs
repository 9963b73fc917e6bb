//! Fixity Server - REST API for the file-integrity registry
//!
//! Exposes fixity-core over HTTP:
//! - POST /hash - Register uploaded files
//! - POST /verify-multi - Look up candidate files
//! - POST /verify - Compare a file against an expected fingerprint
//! - GET /uploads, DELETE /uploads/{hash} - Administer records

use std::net::SocketAddr;

use anyhow::Context;
use fixity_core::Registry;
use fixity_server::{create_router_with_config, open_store, AppState, Config, PoolSettings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %format!("{:#}", e), "Server exited with error");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env();

    let store = open_store(
        config.database_url.as_deref().unwrap_or_default(),
        PoolSettings::from(&config),
    )
    .await
    .context("failed to open registry store")?;
    tracing::info!(backend = store.backend(), "Registry store ready");

    let registry = Registry::new(store);
    let state = AppState::new(registry.clone(), &config);
    let app = create_router_with_config(&config, state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, "Fixity server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    registry.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received, draining connections");
}
