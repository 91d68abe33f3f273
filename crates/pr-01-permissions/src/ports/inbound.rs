//! # Inbound Ports (Driving Ports / API)
//!
//! What the publish pipeline needs from this subsystem.

use crate::domain::authorizer::Decision;
use crate::domain::snapshot::PermissionSnapshot;
use std::sync::Arc;

/// Read-side API over the live permission table.
///
/// Implementations must be thread-safe (`Send + Sync`) and must never block
/// a reader on an in-progress refresh.
pub trait PermissionApi: Send + Sync {
    /// The snapshot currently in effect.
    fn snapshot(&self) -> Arc<PermissionSnapshot>;

    /// Check `identity` against the current snapshot for every claimed parcel.
    fn authorize(&self, identity: &str, claimed: &[String]) -> Decision;
}
