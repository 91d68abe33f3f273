//! # Relay Gateway Service
//!
//! Wires the publish pipeline and discovery proxy into an axum router and
//! runs it until shutdown is signalled.
//!
//! ## Routes
//!
//! | Method | Path                | Handler            |
//! |--------|---------------------|--------------------|
//! | GET    | `/health/ready`     | `health_ready`     |
//! | GET    | `/health/startup`   | `health_startup`   |
//! | GET    | `/health/live`      | `health_live`      |
//! | GET    | `/about`            | `about`            |
//! | POST   | `/content/entities` | `publish`          |
//! | GET    | `/content/*`        | `discovery`        |

use crate::domain::config::{AboutConfig, RelayConfig};
use crate::domain::error::GatewayError;
use crate::handlers;
use crate::middleware::{create_cors_layer, TracingLayer};
use crate::publish::PublishPipeline;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use pr_01_permissions::PermissionApi;
use pr_02_auth_chain::RelaySigner;
use pr_03_upload_relay::{ContentStore, DiscoveryProxy, UploadRelay};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: PublishPipeline,
    pub discovery: DiscoveryProxy,
    pub about: Arc<AboutConfig>,
}

/// The relay's HTTP front.
pub struct RelayGatewayService {
    config: RelayConfig,
    state: AppState,
}

impl RelayGatewayService {
    /// Validate `config` and assemble the service around its collaborators.
    pub fn new(
        config: RelayConfig,
        permissions: Arc<dyn PermissionApi>,
        signer: Arc<RelaySigner>,
        store: Arc<dyn ContentStore>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;

        let relay = UploadRelay::new(Arc::clone(&store), config.upstream.response_policy);
        let state = AppState {
            pipeline: PublishPipeline::new(permissions, signer, relay),
            discovery: DiscoveryProxy::new(store),
            about: Arc::new(config.about.clone()),
        };

        Ok(Self { config, state })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone(), &self.config)
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener, GatewayError> {
        let addr = self.config.http_addr();
        TcpListener::bind(addr)
            .await
            .map_err(|source| GatewayError::Bind { addr, source })
    }

    /// Serve on `listener` until `shutdown` turns true (or its sender is
    /// dropped). In-flight requests are allowed to finish.
    pub async fn serve(
        self,
        listener: TcpListener,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), GatewayError> {
        let router = self.router();
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, upstream = %self.config.upstream.base_url, "Relay gateway listening");
        }

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.wait_for(|stop| *stop).await;
            })
            .await
            .map_err(GatewayError::Serve)?;

        info!("Relay gateway stopped");
        Ok(())
    }
}

/// Build the router with middleware.
pub fn build_router(state: AppState, config: &RelayConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TracingLayer::new())
        .layer(create_cors_layer(&config.cors));

    Router::new()
        .route("/health/ready", get(handlers::health_ready))
        .route("/health/startup", get(handlers::health_startup))
        .route("/health/live", get(handlers::health_live))
        .route("/about", get(handlers::about))
        .route(
            "/content/entities",
            post(handlers::publish)
                .get(handlers::discovery)
                .layer(DefaultBodyLimit::max(config.limits.max_upload_bytes)),
        )
        .route("/content/*path", get(handlers::discovery))
        .with_state(state)
        .layer(middleware)
}
