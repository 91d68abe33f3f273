//! # Auth Chain Subsystem (PR-02)
//!
//! Decodes the authorization chain attached to a publish request, recovers
//! who actually signed the entity, and produces the relay's own chain for the
//! outbound upload.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): typed chain links, secp256k1 recovery,
//!   error taxonomy. No I/O.
//! - **Codec** (`codec.rs`): wire decoding (JSON or bracket-indexed form
//!   fields) and signer verification.
//! - **Signer** (`signer.rs`): the relay's signing key and chain construction.
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: high-S signatures are rejected
//! - **Fail-Closed**: a signature that cannot be recovered is an error, never
//!   a garbage address
//! - **Key Hygiene**: the relay key is zeroized on drop and redacted in `Debug`

pub mod codec;
pub mod domain;
pub mod signer;

// Re-export public API
pub use codec::{AuthChainCodec, VerifiedSigner, AUTH_CHAIN_FIELD};
pub use domain::ecdsa::{address_from_pubkey, keccak256, personal_message_hash, EcdsaSignature};
pub use domain::errors::{ChainError, SignatureError, SignerError};
pub use domain::link::{AuthChain, ChainLink, ChainLinkKind, RawChainLink};
pub use signer::RelaySigner;
