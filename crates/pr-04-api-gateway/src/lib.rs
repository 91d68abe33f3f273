//! # Relay API Gateway (PR-04)
//!
//! The relay's HTTP surface: liveness probes, the realm descriptor, public
//! discovery reads passed through to the upstream, and the gated publish
//! endpoint.
//!
//! ## Architecture
//!
//! - **Domain** (`domain/`): `RelayConfig`, error → status mapping, `/about`
//! - **Publish** (`publish.rs`): codec → authorizer → signer → relay, no HTTP
//! - **Handlers** (`handlers.rs`): multipart intake and response shaping
//! - **Middleware** (`middleware/`): request tracing and CORS
//! - **Service** (`service.rs`): router assembly and graceful serve
//!
//! ## Publish Request Flow
//!
//! ```text
//! multipart ──► stage files to temp dir ──► verify chain ──► read pointers
//!                                                              │
//!            upstream ◄── relay chain ◄── authorize ◄──────────┘
//! ```

pub mod domain;
pub mod handlers;
pub mod middleware;
pub mod publish;
pub mod service;

// Re-export public API
pub use domain::{
    about_document, parse_duration, AboutConfig, ConfigError, CorsConfig, DiscoveryError,
    GatewayError, HttpConfig, LimitsConfig, PermissionsConfig, PublishError, RelayConfig,
    UpstreamConfig,
};
pub use handlers::EDGE_TIMEOUT_HEADER;
pub use publish::{PublishPipeline, PublishRequest};
pub use service::{build_router, AppState, RelayGatewayService};
