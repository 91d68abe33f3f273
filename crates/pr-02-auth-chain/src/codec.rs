//! # Auth Chain Codec
//!
//! Turns the chain attached to a publish request into a typed `AuthChain`
//! and proves who signed it.
//!
//! ## Wire Encodings
//!
//! - A single `authChain` field holding a JSON array of links.
//! - Bracket-indexed fields `authChain[i][type]`, `authChain[i][payload]`,
//!   `authChain[i][signature]`, as emitted by the upstream client library.
//!
//! ## Verification Order
//!
//! 1. Exactly one SIGNER link
//! 2. Exactly one ECDSA_SIGNED_ENTITY link
//! 3. Signed payload equals the declared entity id
//! 4. Signature recovers to an address
//! 5. Recovered address equals the SIGNER payload, ignoring case

use crate::domain::ecdsa::{recover_personal_signer, EcdsaSignature};
use crate::domain::errors::ChainError;
use crate::domain::link::{AuthChain, ChainLinkKind, RawChainLink};
use shared_types::{Address, EntityId};
use std::collections::BTreeMap;
use tracing::debug;

/// Multipart field name carrying the chain.
pub const AUTH_CHAIN_FIELD: &str = "authChain";

/// A signer whose declared identity matched the recovered one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSigner {
    /// Address recovered from the signature.
    pub address: Address,
    /// SIGNER payload as the client sent it.
    pub declared: String,
}

impl VerifiedSigner {
    /// Lower-case `0x…` lookup key for the permission table.
    pub fn identity(&self) -> String {
        self.address.to_string()
    }
}

#[derive(Default)]
struct PartialLink {
    kind: Option<String>,
    payload: Option<String>,
    signature: Option<String>,
}

/// Stateless codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthChainCodec;

impl AuthChainCodec {
    pub fn new() -> Self {
        Self
    }

    /// Decode the JSON array form.
    pub fn decode_json(&self, raw: &str) -> Result<AuthChain, ChainError> {
        let links: Vec<RawChainLink> = serde_json::from_str(raw)?;
        Ok(AuthChain::from_raw(links))
    }

    /// Decode the chain from the text fields of a multipart form.
    ///
    /// Fields unrelated to the chain are ignored. A request carrying no chain
    /// fields at all decodes to an empty chain, which then fails verification
    /// with `MissingSigner`. Mixing both encodings is rejected.
    pub fn decode_form_fields<K, V>(&self, fields: &[(K, V)]) -> Result<AuthChain, ChainError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut json = None;
        let mut indexed: BTreeMap<usize, PartialLink> = BTreeMap::new();

        for (name, value) in fields {
            let (name, value) = (name.as_ref(), value.as_ref());
            if name == AUTH_CHAIN_FIELD {
                if json.replace(value).is_some() {
                    return Err(ChainError::InvalidFormat("repeated authChain field".into()));
                }
                continue;
            }
            let Some((index, key)) = parse_indexed_name(name)? else {
                continue;
            };

            let link = indexed.entry(index).or_default();
            let slot = match key {
                "type" => &mut link.kind,
                "payload" => &mut link.payload,
                "signature" => &mut link.signature,
                other => {
                    return Err(ChainError::InvalidFormat(format!(
                        "unknown link field {other:?}"
                    )))
                }
            };
            if slot.replace(value.to_string()).is_some() {
                return Err(ChainError::InvalidFormat(format!("repeated field {name}")));
            }
        }

        match json {
            Some(_) if !indexed.is_empty() => Err(ChainError::InvalidFormat(
                "both JSON and indexed chain fields present".into(),
            )),
            Some(raw) => self.decode_json(raw),
            None => assemble_indexed(indexed),
        }
    }

    /// Encode a chain as bracket-indexed form fields, in link order.
    pub fn encode_form_fields(&self, chain: &AuthChain) -> Vec<(String, String)> {
        let mut fields = Vec::with_capacity(chain.len() * 3);
        for (i, link) in chain.to_raw().into_iter().enumerate() {
            fields.push((format!("{AUTH_CHAIN_FIELD}[{i}][type]"), link.kind.to_string()));
            fields.push((format!("{AUTH_CHAIN_FIELD}[{i}][payload]"), link.payload));
            fields.push((format!("{AUTH_CHAIN_FIELD}[{i}][signature]"), link.signature));
        }
        fields
    }

    /// Prove that the SIGNER link's identity signed `entity_id`.
    pub fn verify(&self, chain: &AuthChain, entity_id: &EntityId) -> Result<VerifiedSigner, ChainError> {
        let declared = chain.signer()?;
        let (payload, signature) = chain.signed_entity()?;

        if payload != entity_id.as_str() {
            return Err(ChainError::EntityIdMismatch {
                signed: payload.to_string(),
                declared: entity_id.as_str().to_string(),
            });
        }

        let signature =
            EcdsaSignature::from_hex(signature).map_err(ChainError::SignatureRecoveryFailed)?;
        let recovered = recover_personal_signer(payload.as_bytes(), &signature)
            .map_err(ChainError::SignatureRecoveryFailed)?;

        if !declared.trim().eq_ignore_ascii_case(&recovered.to_string()) {
            return Err(ChainError::IdentityMismatch {
                declared: declared.to_string(),
                recovered,
            });
        }

        debug!(signer = %recovered, entity = %entity_id, "Auth chain verified");
        Ok(VerifiedSigner {
            address: recovered,
            declared: declared.to_string(),
        })
    }
}

/// `authChain[3][payload]` → `Some((3, "payload"))`. Names outside the
/// `authChain[` namespace → `None`.
fn parse_indexed_name(name: &str) -> Result<Option<(usize, &str)>, ChainError> {
    let Some(rest) = name
        .strip_prefix(AUTH_CHAIN_FIELD)
        .and_then(|rest| rest.strip_prefix('['))
    else {
        return Ok(None);
    };

    let malformed = || ChainError::InvalidFormat(format!("bad chain field name {name:?}"));
    let (index, rest) = rest.split_once("][").ok_or_else(malformed)?;
    let key = rest.strip_suffix(']').ok_or_else(malformed)?;
    let index = index.parse::<usize>().map_err(|_| malformed())?;
    Ok(Some((index, key)))
}

fn assemble_indexed(indexed: BTreeMap<usize, PartialLink>) -> Result<AuthChain, ChainError> {
    let mut links = Vec::with_capacity(indexed.len());
    for (expected, (index, link)) in indexed.into_iter().enumerate() {
        if index != expected {
            return Err(ChainError::InvalidFormat(format!("missing link {expected}")));
        }
        let kind: ChainLinkKind = link
            .kind
            .ok_or_else(|| ChainError::InvalidFormat(format!("link {index} has no type")))?
            .parse()?;
        let payload = link
            .payload
            .ok_or_else(|| ChainError::InvalidFormat(format!("link {index} has no payload")))?;
        links.push(RawChainLink {
            kind,
            payload,
            signature: link.signature.unwrap_or_default(),
        });
    }
    Ok(AuthChain::from_raw(links))
}
