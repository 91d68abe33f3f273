//! # Parcel-Relay
//!
//! Gatekeeping relay in front of a decentralized content store.

use anyhow::{Context, Result};
use relay_runtime::{load_config, signer_from_env, supervise, RelayRuntime, LOG_FORMAT_VAR};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var(LOG_FORMAT_VAR)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the process environment still applies.
    let dotenv = dotenvy::dotenv();

    init_logging();
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    let config = load_config().context("Invalid configuration")?;
    let signer = signer_from_env()?;

    let runtime = RelayRuntime::new(config, signer)?;
    let listener = runtime.bind().await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let server = tokio::spawn(runtime.run(listener, shutdown_rx));

    info!("Relay is running. Press Ctrl+C to stop.");
    supervise(server, tokio::signal::ctrl_c(), shutdown_tx).await?;
    info!("Shutdown complete");
    Ok(())
}
