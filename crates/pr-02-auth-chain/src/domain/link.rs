//! # Chain Links
//!
//! An auth chain is an ordered list of links. On the wire each link is a flat
//! `{type, payload, signature}` object; in memory it is a tagged enum so that
//! every lookup is an exhaustive match on the kind.

use crate::domain::errors::ChainError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// LINK KINDS
// =============================================================================

/// The recognised link kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainLinkKind {
    #[serde(rename = "SIGNER")]
    Signer,
    #[serde(rename = "ECDSA_EPHEMERAL")]
    EcdsaEphemeral,
    #[serde(rename = "ECDSA_SIGNED_ENTITY")]
    EcdsaSignedEntity,
    #[serde(rename = "ECDSA_EIP_1654_EPHEMERAL")]
    EcdsaEip1654Ephemeral,
    #[serde(rename = "ECDSA_EIP_1654_SIGNED_ENTITY")]
    EcdsaEip1654SignedEntity,
}

impl ChainLinkKind {
    pub const ALL: [ChainLinkKind; 5] = [
        ChainLinkKind::Signer,
        ChainLinkKind::EcdsaEphemeral,
        ChainLinkKind::EcdsaSignedEntity,
        ChainLinkKind::EcdsaEip1654Ephemeral,
        ChainLinkKind::EcdsaEip1654SignedEntity,
    ];

    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainLinkKind::Signer => "SIGNER",
            ChainLinkKind::EcdsaEphemeral => "ECDSA_EPHEMERAL",
            ChainLinkKind::EcdsaSignedEntity => "ECDSA_SIGNED_ENTITY",
            ChainLinkKind::EcdsaEip1654Ephemeral => "ECDSA_EIP_1654_EPHEMERAL",
            ChainLinkKind::EcdsaEip1654SignedEntity => "ECDSA_EIP_1654_SIGNED_ENTITY",
        }
    }
}

impl fmt::Display for ChainLinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainLinkKind {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChainLinkKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ChainError::InvalidFormat(format!("unknown link type {s:?}")))
    }
}

// =============================================================================
// WIRE FORM
// =============================================================================

/// A link exactly as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawChainLink {
    #[serde(rename = "type")]
    pub kind: ChainLinkKind,
    pub payload: String,
    /// Empty for SIGNER links. `null` and a missing field both read as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub signature: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// TYPED FORM
// =============================================================================

/// A typed chain link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainLink {
    /// Declares who claims to be publishing. Carries no signature.
    Signer { address: String },
    EcdsaEphemeral { payload: String, signature: String },
    /// Signature over the entity id.
    EcdsaSignedEntity { payload: String, signature: String },
    EcdsaEip1654Ephemeral { payload: String, signature: String },
    EcdsaEip1654SignedEntity { payload: String, signature: String },
}

impl ChainLink {
    pub fn kind(&self) -> ChainLinkKind {
        match self {
            ChainLink::Signer { .. } => ChainLinkKind::Signer,
            ChainLink::EcdsaEphemeral { .. } => ChainLinkKind::EcdsaEphemeral,
            ChainLink::EcdsaSignedEntity { .. } => ChainLinkKind::EcdsaSignedEntity,
            ChainLink::EcdsaEip1654Ephemeral { .. } => ChainLinkKind::EcdsaEip1654Ephemeral,
            ChainLink::EcdsaEip1654SignedEntity { .. } => ChainLinkKind::EcdsaEip1654SignedEntity,
        }
    }

    pub fn payload(&self) -> &str {
        match self {
            ChainLink::Signer { address } => address,
            ChainLink::EcdsaEphemeral { payload, .. }
            | ChainLink::EcdsaSignedEntity { payload, .. }
            | ChainLink::EcdsaEip1654Ephemeral { payload, .. }
            | ChainLink::EcdsaEip1654SignedEntity { payload, .. } => payload,
        }
    }

    pub fn signature(&self) -> &str {
        match self {
            ChainLink::Signer { .. } => "",
            ChainLink::EcdsaEphemeral { signature, .. }
            | ChainLink::EcdsaSignedEntity { signature, .. }
            | ChainLink::EcdsaEip1654Ephemeral { signature, .. }
            | ChainLink::EcdsaEip1654SignedEntity { signature, .. } => signature,
        }
    }

    pub fn to_raw(&self) -> RawChainLink {
        RawChainLink {
            kind: self.kind(),
            payload: self.payload().to_string(),
            signature: self.signature().to_string(),
        }
    }
}

impl From<RawChainLink> for ChainLink {
    fn from(raw: RawChainLink) -> Self {
        let RawChainLink {
            kind,
            payload,
            signature,
        } = raw;
        match kind {
            ChainLinkKind::Signer => ChainLink::Signer { address: payload },
            ChainLinkKind::EcdsaEphemeral => ChainLink::EcdsaEphemeral { payload, signature },
            ChainLinkKind::EcdsaSignedEntity => ChainLink::EcdsaSignedEntity { payload, signature },
            ChainLinkKind::EcdsaEip1654Ephemeral => {
                ChainLink::EcdsaEip1654Ephemeral { payload, signature }
            }
            ChainLinkKind::EcdsaEip1654SignedEntity => {
                ChainLink::EcdsaEip1654SignedEntity { payload, signature }
            }
        }
    }
}

/// An ordered auth chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthChain(Vec<ChainLink>);

impl AuthChain {
    pub fn new(links: Vec<ChainLink>) -> Self {
        Self(links)
    }

    pub fn from_raw(raw: Vec<RawChainLink>) -> Self {
        Self(raw.into_iter().map(ChainLink::from).collect())
    }

    pub fn to_raw(&self) -> Vec<RawChainLink> {
        self.0.iter().map(ChainLink::to_raw).collect()
    }

    pub fn links(&self) -> &[ChainLink] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The declared publisher. Exactly one SIGNER link must be present.
    pub fn signer(&self) -> Result<&str, ChainError> {
        let mut found = None;
        for link in &self.0 {
            if let ChainLink::Signer { address } = link {
                if found.is_some() {
                    return Err(ChainError::DuplicateLink(ChainLinkKind::Signer));
                }
                found = Some(address.as_str());
            }
        }
        found.ok_or(ChainError::MissingSigner)
    }

    /// `(payload, signature)` of the single ECDSA_SIGNED_ENTITY link.
    pub fn signed_entity(&self) -> Result<(&str, &str), ChainError> {
        let mut found = None;
        for link in &self.0 {
            match link {
                ChainLink::EcdsaSignedEntity { payload, signature } => {
                    if found.is_some() {
                        return Err(ChainError::DuplicateLink(ChainLinkKind::EcdsaSignedEntity));
                    }
                    found = Some((payload.as_str(), signature.as_str()));
                }
                ChainLink::Signer { .. }
                | ChainLink::EcdsaEphemeral { .. }
                | ChainLink::EcdsaEip1654Ephemeral { .. }
                | ChainLink::EcdsaEip1654SignedEntity { .. } => {}
            }
        }
        found.ok_or(ChainError::MissingSignature)
    }
}
