//! # Adapters
//!
//! `ContentStore` implementations.

pub mod http_store;

pub use http_store::{HttpContentStore, UPLOAD_ORIGIN_HEADER};
