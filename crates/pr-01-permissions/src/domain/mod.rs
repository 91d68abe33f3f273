//! # Domain Layer
//!
//! Pure permission logic with no I/O dependencies.

pub mod authorizer;
pub mod errors;
pub mod record;
pub mod snapshot;
