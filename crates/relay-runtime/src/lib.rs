//! # Relay Runtime Library
//!
//! Assembles the subsystems into a running relay. The `main.rs` binary is a
//! thin wrapper around `RelayRuntime`; integration tests drive it directly.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults + `PR_*` environment)
//! 2. Provision the relay signing key from `PR_SIGNING_KEY`
//! 3. Load the permission table once (failure is logged; the table stays
//!    empty and every publish is denied until a refresh succeeds)
//! 4. Spawn the periodic refresh task
//! 5. Serve HTTP until shutdown is signalled, or until the server stops on
//!    its own (see [`supervise`])

pub mod config;

use anyhow::{Context, Result};
use pr_01_permissions::{refresh_task, source_from_location, PermissionService};
use pr_02_auth_chain::RelaySigner;
use pr_03_upload_relay::{ContentStore, HttpContentStore};
use pr_04_api_gateway::{RelayConfig, RelayGatewayService};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub use config::{apply_env, load_config, LOG_FORMAT_VAR, SIGNING_KEY_VAR};

/// A fully wired relay, ready to serve.
pub struct RelayRuntime {
    config: RelayConfig,
    permissions: Arc<PermissionService>,
    gateway: RelayGatewayService,
}

impl RelayRuntime {
    /// Wire the relay against the configured upstream.
    pub fn new(config: RelayConfig, signer: RelaySigner) -> Result<Self> {
        let store = Arc::new(HttpContentStore::new(
            config.upstream.base_url.clone(),
            config.upstream.upload_origin.clone(),
            config.upstream.upload_timeout,
            config.upstream.discovery_timeout,
        ));
        Self::with_store(config, signer, store)
    }

    /// Wire the relay against an arbitrary content store.
    pub fn with_store(
        config: RelayConfig,
        signer: RelaySigner,
        store: Arc<dyn ContentStore>,
    ) -> Result<Self> {
        let source = source_from_location(
            &config.permissions.source,
            config.permissions.fetch_timeout,
        );
        let permissions = Arc::new(PermissionService::new(source));

        info!(relay = %signer.address(), "Relay signing identity loaded");
        let gateway = RelayGatewayService::new(
            config.clone(),
            permissions.clone(),
            Arc::new(signer),
            store,
        )
        .context("Failed to assemble relay gateway")?;

        Ok(Self {
            config,
            permissions,
            gateway,
        })
    }

    pub fn permissions(&self) -> Arc<PermissionService> {
        Arc::clone(&self.permissions)
    }

    /// Bind the configured HTTP address.
    pub async fn bind(&self) -> Result<TcpListener> {
        self.gateway
            .bind()
            .await
            .context("Failed to bind HTTP listener")
    }

    /// Load permissions, start the refresh task and serve on `listener` until
    /// `shutdown` turns true.
    pub async fn run(self, listener: TcpListener, shutdown: watch::Receiver<bool>) -> Result<()> {
        info!("===========================================");
        info!("  Parcel-Relay v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        self.permissions.refresh_logged().await;

        let refresher = tokio::spawn(refresh_task(
            Arc::clone(&self.permissions),
            self.config.permissions.refresh_interval,
            shutdown.clone(),
        ));
        info!(
            source = %self.config.permissions.source,
            interval = ?self.config.permissions.refresh_interval,
            "Permission refresh scheduled"
        );

        let served = self.gateway.serve(listener, shutdown).await;
        refresher.abort();
        let _ = refresher.await;

        served.context("HTTP server failed")
    }
}

/// Wait for either the server task to finish or `shutdown_signal` to fire.
///
/// On the signal, flips `shutdown` and waits for a graceful exit. A server
/// that stops first returns its own result immediately.
pub async fn supervise<S>(
    mut server: JoinHandle<Result<()>>,
    shutdown_signal: S,
    shutdown: watch::Sender<bool>,
) -> Result<()>
where
    S: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        joined = &mut server => {
            warn!("Server stopped before shutdown was requested");
            return joined.context("Server task panicked")?;
        }
        signal = shutdown_signal => {
            signal.context("Failed to listen for shutdown signal")?;
        }
    }

    info!("Initiating graceful shutdown...");
    if shutdown.send(true).is_err() {
        warn!("Server already stopped");
    }
    server.await.context("Server task panicked")?
}

/// Parse the relay key from its environment variable.
pub fn signer_from_env() -> Result<RelaySigner> {
    let key = std::env::var(SIGNING_KEY_VAR)
        .with_context(|| format!("{SIGNING_KEY_VAR} is not set"))?;
    RelaySigner::from_hex(&key).with_context(|| format!("{SIGNING_KEY_VAR} is not a valid key"))
}
