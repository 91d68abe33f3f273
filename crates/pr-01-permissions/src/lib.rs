//! # Parcel Permissions Subsystem (PR-01)
//!
//! Maintains the table of which signer identities may publish to which
//! parcels, and answers allow/deny questions against it.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): records, snapshot derivation, authorizer. No I/O.
//! - **Ports Layer** (`ports/`): `PermissionApi` (driving), `AuthorizationSource` (driven)
//! - **Adapters Layer** (`adapters/`): file and HTTP authorization sources
//! - **Service Layer** (`service.rs`): atomic snapshot handle and refresh loop
//!
//! ## Concurrency
//!
//! The live snapshot is an `Arc<PermissionSnapshot>` behind a pointer-sized
//! lock. A refresh builds the next snapshot completely before publishing it
//! with a single swap, so readers see either the old table or the new one and
//! never a half-built one. No lock is held across an `.await`.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::{source_from_location, FileAuthorizationSource, HttpAuthorizationSource};
pub use domain::authorizer::{Decision, DenyReason, ParcelAuthorizer};
pub use domain::errors::{PermissionError, SourceError};
pub use domain::record::{AuthorizationRecord, Timestamp};
pub use domain::snapshot::{PermissionSnapshot, SnapshotStats};
pub use ports::inbound::PermissionApi;
pub use ports::outbound::AuthorizationSource;
pub use service::{refresh_task, PermissionService, RefreshReport};
