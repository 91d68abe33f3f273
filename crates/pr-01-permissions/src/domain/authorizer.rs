//! # Parcel Authorizer
//!
//! Decides whether an already-verified signer may publish an entity that
//! claims a given list of parcels. No partial authorization: one missing
//! parcel vetoes the whole entity.

use crate::domain::snapshot::PermissionSnapshot;
use shared_types::ParcelCoord;
use std::fmt;

/// Why a publish was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// The signer has no entry in the permission table.
    UnknownSigner,
    /// The first claimed parcel the signer may not publish to, verbatim.
    ParcelNotAuthorized(String),
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::UnknownSigner => write!(f, "Address not found"),
            DenyReason::ParcelNotAuthorized(parcel) => {
                write!(f, "You don't have access to this land: {}", parcel)
            }
        }
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Stateless parcel authorizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParcelAuthorizer;

impl ParcelAuthorizer {
    pub fn new() -> Self {
        Self
    }

    /// Allow iff every claimed parcel is in the signer's permission set.
    ///
    /// A claim must be the canonical `"x,y"` spelling of a granted
    /// coordinate. Unparseable or non-canonical claims (`"010,+10"`,
    /// `" 10 , 10 "`) are denied as unauthorized, since the pointer string is
    /// forwarded upstream unchanged.
    pub fn authorize<S: AsRef<str>>(
        &self,
        snapshot: &PermissionSnapshot,
        identity: &str,
        claimed: &[S],
    ) -> Decision {
        let Some(granted) = snapshot.parcels_for(identity) else {
            return Decision::Deny(DenyReason::UnknownSigner);
        };

        for parcel in claimed {
            let parcel = parcel.as_ref();
            let covered = parcel
                .parse::<ParcelCoord>()
                .map(|coord| coord.to_string() == parcel && granted.contains(&coord))
                .unwrap_or(false);
            if !covered {
                return Decision::Deny(DenyReason::ParcelNotAuthorized(parcel.to_string()));
            }
        }

        Decision::Allow
    }
}
