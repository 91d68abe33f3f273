//! # Adapters
//!
//! `AuthorizationSource` implementations.

pub mod file_source;
pub mod http_source;

pub use file_source::FileAuthorizationSource;
pub use http_source::HttpAuthorizationSource;

use crate::ports::outbound::AuthorizationSource;
use std::sync::Arc;
use std::time::Duration;

/// Pick an adapter from a configured location: `http(s)://` URLs are fetched,
/// anything else is treated as a local path.
pub fn source_from_location(location: &str, timeout: Duration) -> Arc<dyn AuthorizationSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Arc::new(HttpAuthorizationSource::new(location, timeout))
    } else {
        Arc::new(FileAuthorizationSource::new(location))
    }
}
