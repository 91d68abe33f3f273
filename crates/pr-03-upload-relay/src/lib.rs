//! # Upload Relay Subsystem (PR-03)
//!
//! Everything that touches the upstream content store.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): staged upload files, the outbound upload,
//!   response narrowing, discovery header filtering
//! - **Ports Layer** (`ports/`): `ContentStore` (driven)
//! - **Adapters Layer** (`adapters/`): `HttpContentStore` over reqwest
//! - **Service Layer** (`service.rs`): `UploadRelay` and `DiscoveryProxy`
//!
//! ## Cancellation
//!
//! Both services are plain futures. Dropping one (because the inbound client
//! went away) drops the in-flight reqwest call with it, so an abandoned
//! request is never completed upstream.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::HttpContentStore;
pub use domain::errors::RelayError;
pub use domain::files::{StagingWriter, UploadFileSet, UploadedFile};
pub use domain::outbound::{OutboundUpload, ENTITY_ID_FIELD};
pub use domain::policy::ResponsePolicy;
pub use domain::proxy::{is_content_read_path, is_forwardable_header, ProxiedResponse, CONTENT_PREFIX};
pub use domain::upstream::UpstreamResponse;
pub use ports::outbound::ContentStore;
pub use service::{DiscoveryProxy, UploadRelay};
