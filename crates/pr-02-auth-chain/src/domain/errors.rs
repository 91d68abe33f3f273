//! # Auth Chain Errors
//!
//! The `Display` text of every `ChainError` is the short reason returned to
//! the client in a 403 body. Detail that must not reach the client lives in
//! fields and is only logged.

use crate::domain::link::ChainLinkKind;
use shared_types::Address;
use thiserror::Error;

/// Low-level signature failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// Not hex, or not 65 bytes once decoded.
    #[error("Invalid signature format")]
    InvalidFormat,

    /// r or s is zero or not below the curve order.
    #[error("Signature scalar out of range")]
    InvalidScalar,

    /// s is in the upper half of the curve order (EIP-2).
    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    /// v must be 0, 1, 27 or 28.
    #[error("Invalid recovery ID: {0}")]
    InvalidRecoveryId(u8),

    /// No public key could be recovered.
    #[error("Failed to recover public key")]
    RecoveryFailed,
}

/// Why an inbound chain was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("No AuthChain SIGNER")]
    MissingSigner,

    #[error("No signature")]
    MissingSignature,

    /// A link kind that must appear once appeared more than once.
    #[error("Duplicate {0} link")]
    DuplicateLink(ChainLinkKind),

    #[error("Invalid signature")]
    SignatureRecoveryFailed(#[source] SignatureError),

    #[error("Address doesn't match")]
    IdentityMismatch { declared: String, recovered: Address },

    /// The signed payload is not the entity being published.
    #[error("Signed payload doesn't match entity")]
    EntityIdMismatch { signed: String, declared: String },

    #[error("Malformed auth chain: {0}")]
    InvalidFormat(String),
}

impl From<serde_json::Error> for ChainError {
    fn from(e: serde_json::Error) -> Self {
        ChainError::InvalidFormat(e.to_string())
    }
}

/// Failures while producing the relay's own signature.
#[derive(Debug, Error)]
pub enum SignerError {
    /// The provisioned key is not 32 bytes of hex or not a valid scalar.
    #[error("invalid relay signing key: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),
}
