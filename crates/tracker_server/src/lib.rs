//! HTTP surface of the routine tracker.
//!
//! `api` is transport-neutral and testable without sockets; `router` binds it
//! to axum.

pub mod api;
pub mod auth;
pub mod config;
pub mod router;

use anyhow::Context;
use log::info;
use tracker_core::{init_logging, open_db, LinkBuilder};

pub use api::{handle, ApiRequest, ApiResponse, Endpoint, ResponseBody};
pub use config::{ConfigError, ServerConfig};
pub use router::{build_router, AppState};

/// Opens the store, binds the listener and serves until Ctrl-C.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).context("failed to initialize logging")?;
    }
    let addr = config.socket_addr()?;
    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open database `{}`", config.db_path.display()))?;
    let app = build_router(AppState::new(conn, LinkBuilder::new(config.base_url.clone())));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local_addr = listener.local_addr()?;
    info!(
        "event=server_start module=server status=ok addr={local_addr} db_path={}",
        config.db_path.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("event=server_signal module=server status=error error={err}");
    }
}
