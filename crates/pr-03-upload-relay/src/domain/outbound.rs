//! # Outbound Upload
//!
//! The multipart body sent upstream, described as an ordered list of parts
//! before any bytes are read. Order:
//!
//! 1. `entityId`
//! 2. `authChain[i][type|payload|signature]` for each relay chain link
//! 3. every staged file under its original field name, with the field name
//!    as filename

use crate::domain::files::{UploadFileSet, UploadedFile};
use pr_02_auth_chain::{AuthChain, AuthChainCodec};
use shared_types::EntityId;

/// Multipart field name carrying the entity id.
pub const ENTITY_ID_FIELD: &str = "entityId";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundUpload {
    pub entity_id: EntityId,
    pub chain_fields: Vec<(String, String)>,
    pub files: Vec<UploadedFile>,
}

impl OutboundUpload {
    /// Assemble the upload from the relay's chain and the request's files.
    ///
    /// The inbound chain is not part of this; only the relay's chain leaves
    /// the process.
    pub fn new(entity_id: EntityId, relay_chain: &AuthChain, files: &UploadFileSet) -> Self {
        Self {
            entity_id,
            chain_fields: AuthChainCodec::new().encode_form_fields(relay_chain),
            files: files.files().to_vec(),
        }
    }

    /// Field names in the order they are sent.
    pub fn field_names(&self) -> Vec<&str> {
        std::iter::once(ENTITY_ID_FIELD)
            .chain(self.chain_fields.iter().map(|(name, _)| name.as_str()))
            .chain(self.files.iter().map(|f| f.field_name.as_str()))
            .collect()
    }

    pub fn total_file_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}
