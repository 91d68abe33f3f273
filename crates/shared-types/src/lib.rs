//! # Shared Types Crate
//!
//! Value types that cross subsystem boundaries in the relay.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: parcel and address parsing rules live here
//!   and nowhere else, so the permission table and the publish path can never
//!   disagree about what a valid coordinate or identity looks like.
//! - **Normalized Forms**: `Address` always displays lower-case, `ParcelCoord`
//!   always displays as `x,y` with no whitespace.

pub mod entities;
pub mod errors;
pub mod parcel;

pub use entities::*;
pub use errors::*;
pub use parcel::*;
