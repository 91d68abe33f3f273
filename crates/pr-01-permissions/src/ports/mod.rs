//! # Ports Layer
//!
//! - **Inbound (Driving)**: `PermissionApi`, used by the publish pipeline
//! - **Outbound (Driven)**: `AuthorizationSource`, where records come from

pub mod inbound;
pub mod outbound;
