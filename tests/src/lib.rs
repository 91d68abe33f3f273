//! # Parcel-Relay Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks (chain verification, authorization)
//! └── src/integration/  # Cross-crate flows against a mock upstream
//!     ├── support.rs
//!     ├── publish_flows.rs
//!     ├── discovery_flows.rs
//!     └── refresh_flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p pr-tests
//!
//! # By flow
//! cargo test -p pr-tests integration::publish_flows
//!
//! # Benchmarks
//! cargo bench -p pr-tests
//! ```

pub mod integration;
