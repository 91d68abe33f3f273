//! # Relay Services
//!
//! `UploadRelay` forwards an already-authorized upload under the relay's
//! chain. `DiscoveryProxy` passes public reads through. Neither holds any
//! shared state beyond the store handle, so a slow upstream call never
//! blocks anything else.

use crate::domain::errors::RelayError;
use crate::domain::files::UploadFileSet;
use crate::domain::outbound::OutboundUpload;
use crate::domain::policy::ResponsePolicy;
use crate::domain::proxy::{is_content_read_path, ProxiedResponse};
use crate::domain::upstream::UpstreamResponse;
use crate::ports::outbound::ContentStore;
use pr_02_auth_chain::AuthChain;
use shared_types::EntityId;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Forwards authorized uploads upstream.
#[derive(Clone)]
pub struct UploadRelay {
    store: Arc<dyn ContentStore>,
    policy: ResponsePolicy,
}

impl UploadRelay {
    pub fn new(store: Arc<dyn ContentStore>, policy: ResponsePolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> ResponsePolicy {
        self.policy
    }

    /// Send `files` upstream under `relay_chain` and narrow the answer.
    ///
    /// Upstream failures are returned as-is; nothing is retried.
    pub async fn relay(
        &self,
        entity_id: &EntityId,
        relay_chain: &AuthChain,
        files: &UploadFileSet,
    ) -> Result<UpstreamResponse, RelayError> {
        let upload = OutboundUpload::new(entity_id.clone(), relay_chain, files);
        let file_count = upload.files.len();
        let bytes = upload.total_file_bytes();
        let started = Instant::now();

        match self.store.publish(upload).await {
            Ok(response) => {
                info!(
                    entity = %entity_id,
                    files = file_count,
                    bytes,
                    status = response.status,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Upload relayed"
                );
                Ok(self.policy.apply(response))
            }
            Err(e) => {
                warn!(
                    entity = %entity_id,
                    files = file_count,
                    bytes,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "Upload relay failed"
                );
                Err(e)
            }
        }
    }
}

/// Public read-only pass-through.
#[derive(Clone)]
pub struct DiscoveryProxy {
    store: Arc<dyn ContentStore>,
}

impl DiscoveryProxy {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Fetch `path_and_query` upstream; status and body verbatim, headers
    /// narrowed to the whitelist.
    ///
    /// Paths that would escape `/content/` are refused without an upstream
    /// call.
    pub async fn forward(&self, path_and_query: &str) -> Result<ProxiedResponse, RelayError> {
        if !is_content_read_path(path_and_query) {
            return Err(RelayError::ForbiddenPath(path_and_query.to_string()));
        }
        let response = self.store.fetch(path_and_query).await?;
        Ok(response.filtered())
    }
}
