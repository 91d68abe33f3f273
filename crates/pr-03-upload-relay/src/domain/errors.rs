//! # Relay Errors

use thiserror::Error;

/// Failures while staging, relaying or proxying.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The upstream answered with a non-success status.
    #[error("Upstream rejected upload ({status}): {message}")]
    UpstreamRejected { status: u16, message: String },

    /// Network failure or timeout talking to the upstream.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The request's own files are unusable (no entity file, bad entity JSON).
    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    /// A discovery path that would resolve outside `/content/` upstream.
    #[error("Path not proxied: {0}")]
    ForbiddenPath(String),

    /// Local staging I/O failed.
    #[error("Upload staging failed: {0}")]
    Staging(#[from] std::io::Error),
}

impl RelayError {
    /// Status code for `UpstreamRejected`, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            RelayError::UpstreamRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
