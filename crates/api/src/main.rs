//! calsync - Google Calendar synchronization service
//!
//! Loads configuration, opens the database, starts the periodic sync
//! scheduler and serves the HTTP routes until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use calsync_api::utils::logging::init_tracing;
use calsync_api::{build_router, AppContext};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    let config = calsync_infra::config::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) => warn!(error = %e, "no .env file loaded"),
    }

    let bind_address = config.server.bind_address.clone();
    let ctx = Arc::new(AppContext::new(config).context("failed to initialise application")?);

    let scheduler_running =
        ctx.start_scheduler().await.context("failed to start sync scheduler")?;

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    info!(address = %bind_address, scheduler_running, "calsync listening");

    axum::serve(listener, build_router(ctx.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    ctx.shutdown().await.context("failed to stop sync scheduler")?;
    info!("calsync stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
