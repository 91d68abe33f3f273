//! # Ports Layer
//!
//! - **Outbound (Driven)**: `ContentStore`, the upstream content service

pub mod outbound;
