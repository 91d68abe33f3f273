//! Domain layer for the auth chain subsystem.

pub mod ecdsa;
pub mod errors;
pub mod link;
