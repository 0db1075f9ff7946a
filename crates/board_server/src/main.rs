//! Board server entry point.
//!
//! # Responsibility
//! - Load configuration, start logging and open the store.
//! - Serve the `/api` router until Ctrl-C.

use anyhow::Context;
use board_core::db::{open_db, open_db_in_memory};
use board_core::{core_version, init_logging, AuditorProvider, FixedAuditor};
use board_server::{build_router, AppState, ServerConfig};
use log::{info, warn};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load().context("failed to load configuration")?;
    init_logging(config.log_level_or_default(), config.log_dir.as_deref())
        .map_err(anyhow::Error::msg)?;

    let conn = match config.database_path.as_deref() {
        Some(path) => open_db(path).with_context(|| format!("failed to open `{path}`"))?,
        None => {
            warn!("event=db_open module=server status=ok mode=memory reason=no_database_path");
            open_db_in_memory()?
        }
    };

    let auditor: Arc<dyn AuditorProvider> =
        Arc::new(FixedAuditor::new(config.auditor_or_default()));
    let app = build_router(AppState::new(conn, auditor, config.paging()));

    let addr: SocketAddr = config
        .listen_addr_or_default()
        .parse()
        .context("invalid listen_addr")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        "event=server_start module=server status=ok addr={addr} version={}",
        core_version()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("event=shutdown_signal module=server status=error error={err}");
    }
}
