//! # Permission Errors

use thiserror::Error;

/// Failure to obtain or decode the authorization document.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Local file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Remote document could not be fetched.
    #[error("fetch failed: {0}")]
    Http(String),

    /// Remote responded with a non-success status.
    #[error("unexpected status {0}")]
    Status(u16),

    /// Document is not a JSON array of authorization records.
    #[error("malformed authorization document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors surfaced by the permission service.
#[derive(Debug, Error)]
pub enum PermissionError {
    /// Non-fatal: the previous snapshot stays in effect.
    #[error("snapshot refresh failed, keeping generation {kept_generation}: {source}")]
    SnapshotRefreshFailed {
        kept_generation: u64,
        #[source]
        source: SourceError,
    },
}
