//! # Relay Signer
//!
//! Holds the relay's own secp256k1 key and produces the chain the relay
//! attaches to every upload it forwards. The key is injected once at startup
//! and never replaced; `SigningKey` zeroizes itself on drop.

use crate::domain::ecdsa::{address_from_pubkey, personal_message_hash, EcdsaSignature};
use crate::domain::errors::SignerError;
use crate::domain::link::{AuthChain, ChainLink};
use k256::ecdsa::{RecoveryId, SigningKey};
use shared_types::{Address, EntityId};
use std::fmt;
use zeroize::Zeroize;

pub struct RelaySigner {
    key: SigningKey,
    address: Address,
}

impl RelaySigner {
    pub fn new(key: SigningKey) -> Self {
        let address = address_from_pubkey(key.verifying_key());
        Self { key, address }
    }

    /// Parse a 32-byte hex private key, with or without `0x`.
    pub fn from_hex(hex_key: &str) -> Result<Self, SignerError> {
        let hex_key = hex_key.trim();
        let digits = hex_key
            .strip_prefix("0x")
            .or_else(|| hex_key.strip_prefix("0X"))
            .unwrap_or(hex_key);

        let mut bytes = hex::decode(digits)
            .map_err(|_| SignerError::InvalidKey("not hex".into()))?;
        if bytes.len() != 32 {
            let len = bytes.len();
            bytes.zeroize();
            return Err(SignerError::InvalidKey(format!("expected 32 bytes, got {len}")));
        }

        let key = SigningKey::from_slice(&bytes);
        bytes.zeroize();
        let key = key.map_err(|_| SignerError::InvalidKey("not a valid secp256k1 scalar".into()))?;
        Ok(Self::new(key))
    }

    /// The relay's public identity.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Personal-sign `message`. The result is always low-S with `v` in {27, 28}.
    pub fn sign_message(&self, message: &[u8]) -> Result<EcdsaSignature, SignerError> {
        let digest = personal_message_hash(message);
        let (sig, recid) = self
            .key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| SignerError::SigningFailed(e.to_string()))?;

        let (sig, recid) = match sig.normalize_s() {
            Some(normalized) => (
                normalized,
                RecoveryId::new(!recid.is_y_odd(), recid.is_x_reduced()),
            ),
            None => (sig, recid),
        };

        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(&sig.to_bytes());
        bytes[64] = 27 + recid.to_byte();
        EcdsaSignature::from_bytes(&bytes).map_err(|e| SignerError::SigningFailed(e.to_string()))
    }

    /// Build the two-link chain asserting the relay as publisher of `entity_id`.
    ///
    /// Link 0 is `SIGNER` with the relay's checksum address, link 1 is
    /// `ECDSA_SIGNED_ENTITY` with the entity id and the relay's signature.
    pub fn sign(&self, entity_id: &EntityId) -> Result<(AuthChain, Address), SignerError> {
        let signature = self.sign_message(entity_id.as_str().as_bytes())?;
        let chain = AuthChain::new(vec![
            ChainLink::Signer {
                address: self.address.to_checksum(),
            },
            ChainLink::EcdsaSignedEntity {
                payload: entity_id.as_str().to_string(),
                signature: signature.to_hex(),
            },
        ]);
        Ok((chain, self.address))
    }
}

impl fmt::Debug for RelaySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelaySigner")
            .field("address", &self.address)
            .field("key", &"<redacted>")
            .finish()
    }
}
