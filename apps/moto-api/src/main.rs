//! # Moto POS API
//!
//! HTTP server for the motorcycle-parts shop.
//!
//! ## Startup
//! ```text
//! env (MOTO_*) ──► ApiConfig ──► Database (pool + migrations) ──► Router
//!                                                                   │
//!                                     Ctrl+C / SIGTERM ──► graceful shutdown
//! ```

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use moto_api::{app, ApiConfig, AppState};
use moto_db::{Database, DbConfig};

const DEFAULT_LOG_FILTER: &str = "info,moto=debug,sqlx=warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(true)
        .init();

    info!("Starting Moto POS API server...");

    // Load configuration
    let config = ApiConfig::load().context("invalid configuration")?;
    info!(
        port = config.http_port,
        db_path = %config.db_path.display(),
        cache_ttl_secs = config.category_cache_ttl.as_secs(),
        "Configuration loaded"
    );

    // Connect to database (runs migrations)
    let db_config = DbConfig::new(&config.db_path).max_connections(config.db_max_connections);
    let db = Database::new(db_config)
        .await
        .context("failed to open database")?;
    info!("Database ready");

    let state = AppState::new(db.clone(), &config);

    // Build server address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "Starting HTTP server");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
