use std::{env, path::PathBuf};

use anyhow::Context;
use sesmap_utils::{load_config, Config};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // the only (optional) argument is the path to the TOML config file
    let config = match env::args().nth(1) {
        Some(path) => load_config(&PathBuf::from(&path))
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => Config::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.http.log_level)),
        )
        .init();

    let address = config.http.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!(address = %address, "Transform server listening");

    axum::serve(listener, routes::router(config.http.max_body_bytes))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Transform server failed")?;

    info!("Transform server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
