//! # Outbound Ports (Driven Ports / SPI)
//!
//! The upstream content store, seen as a black box.

use crate::domain::errors::RelayError;
use crate::domain::outbound::OutboundUpload;
use crate::domain::proxy::ProxiedResponse;
use crate::domain::upstream::UpstreamResponse;

#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Send a publish upload.
    ///
    /// Non-success statuses are `UpstreamRejected`; network errors and
    /// timeouts are `UpstreamUnavailable`.
    async fn publish(&self, upload: OutboundUpload) -> Result<UpstreamResponse, RelayError>;

    /// GET `path_and_query` (leading `/`) and return whatever came back,
    /// including error statuses. Only network failure is an error.
    async fn fetch(&self, path_and_query: &str) -> Result<ProxiedResponse, RelayError>;
}
