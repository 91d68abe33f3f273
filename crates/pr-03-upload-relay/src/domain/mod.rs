//! # Domain Layer
//!
//! Upload and response shapes. File staging is the only I/O here and it is
//! confined to the request's own temporary directory.

pub mod errors;
pub mod files;
pub mod outbound;
pub mod policy;
pub mod proxy;
pub mod upstream;
