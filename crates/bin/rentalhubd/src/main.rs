//! # rentalhubd: rentalhub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`rentalhub.toml`, `RENTALHUB_*` env vars)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations (adapters) and the property
//!   channel registry
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve until SIGINT/SIGTERM
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer, no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use rentalhub_adapter_http_axum::router;
use rentalhub_adapter_http_axum::state::AppState;
use rentalhub_adapter_storage_sqlite_sqlx::{
    SqliteAssignmentRepository, SqliteDeviceRepository, SqliteOwnerRepository,
    SqlitePropertyRepository,
};
use rentalhub_app::channels::PropertyChannels;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).context("invalid log filter")?,
        )
        .init();

    // Database
    let db = config
        .storage()
        .build()
        .await
        .context("failed to open database")?;
    let pool = db.pool().clone();

    // Repositories
    let device_repo = SqliteDeviceRepository::new(pool.clone());
    let owner_repo = SqliteOwnerRepository::new(pool.clone());
    let property_repo = SqlitePropertyRepository::new(pool.clone());
    let assignment_repo = SqliteAssignmentRepository::new(pool);

    // Real-time fan-out
    let channels = Arc::new(PropertyChannels::new(config.realtime.channel_capacity));

    // HTTP + WebSocket
    let state = AppState::new(
        device_repo,
        owner_repo,
        property_repo,
        assignment_repo,
        channels,
    );
    let cors = router::cors(&config.server.cors_origin).context("invalid CORS origin")?;
    let app = router::build(state).layer(cors);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(url = %config.public_url(), "rentalhubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("rentalhubd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
