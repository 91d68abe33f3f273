//! # Publish Pipeline
//!
//! The gatekeeping decision for `POST /content/entities`, independent of
//! HTTP framing:
//!
//! 1. Decode the auth chain from the text fields
//! 2. Verify it and recover the signer (`MalformedChain` on failure)
//! 3. Read the claimed parcels from the entity file (`MalformedUpload`)
//! 4. Authorize the signer against the current snapshot (`Unauthorized`)
//! 5. Sign the entity id with the relay key
//! 6. Forward the upload under the relay chain (`Upstream`)
//!
//! Steps 1 through 4 never touch the network, so a rejected request costs
//! nothing upstream.

use crate::domain::error::PublishError;
use pr_01_permissions::{Decision, PermissionApi};
use pr_02_auth_chain::{AuthChainCodec, RelaySigner};
use pr_03_upload_relay::{UploadFileSet, UploadRelay, UpstreamResponse};
use shared_types::EntityId;
use std::sync::Arc;
use tracing::{info, warn};

/// A fully received publish request.
#[derive(Debug)]
pub struct PublishRequest {
    pub entity_id: EntityId,
    /// Every text field of the form, in arrival order.
    pub fields: Vec<(String, String)>,
    pub files: UploadFileSet,
}

#[derive(Clone)]
pub struct PublishPipeline {
    codec: AuthChainCodec,
    permissions: Arc<dyn PermissionApi>,
    signer: Arc<RelaySigner>,
    relay: UploadRelay,
}

impl PublishPipeline {
    pub fn new(
        permissions: Arc<dyn PermissionApi>,
        signer: Arc<RelaySigner>,
        relay: UploadRelay,
    ) -> Self {
        Self {
            codec: AuthChainCodec::new(),
            permissions,
            signer,
            relay,
        }
    }

    pub async fn publish(&self, request: &PublishRequest) -> Result<UpstreamResponse, PublishError> {
        let entity_id = &request.entity_id;

        let chain = self.codec.decode_form_fields(&request.fields)?;
        let signer = match self.codec.verify(&chain, entity_id) {
            Ok(signer) => signer,
            Err(e) => {
                warn!(entity = %entity_id, reason = %e, "Rejected publish: bad auth chain");
                return Err(e.into());
            }
        };
        let identity = signer.identity();

        let entity = request.files.read_entity(entity_id).await?;

        if let Decision::Deny(reason) = self.permissions.authorize(&identity, &entity.pointers) {
            warn!(
                entity = %entity_id,
                signer = %identity,
                pointers = entity.pointers.len(),
                reason = %reason,
                "Rejected publish: not authorized"
            );
            return Err(PublishError::Unauthorized(reason));
        }

        let (relay_chain, relay_address) = self.signer.sign(entity_id)?;
        info!(
            entity = %entity_id,
            signer = %identity,
            relay = %relay_address,
            pointers = entity.pointers.len(),
            files = request.files.len(),
            "Publish authorized, relaying"
        );

        Ok(self.relay.relay(entity_id, &relay_chain, &request.files).await?)
    }
}
