//! Standalone appointments server.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};

use api_gateway::{create_router, log_filter, AppState};
use shared::{Config, SqlAppointmentStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .init();

    if let Err(e) = run().await {
        error!(error = ?e, "appointments server stopped");
        return Err(e);
    }

    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    let store = SqlAppointmentStore::connect(&config)
        .await
        .context("failed to initialise database")?;
    info!(database = ?config.database, "database connection established");

    let app = create_router(AppState::new(store), &config.docs_dir);

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, "Listening for HTTP traffic");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
