//! Error types for the relay gateway and their HTTP mapping.
//!
//! | Error              | Status |
//! |--------------------|--------|
//! | `MalformedChain`   | 403    |
//! | `Unauthorized`     | 403    |
//! | `MalformedUpload`  | 400    |
//! | `Upstream`         | 400    |
//! | `Multipart`        | from the multipart parser (400 / 413) |
//! | `Signing`, `Staging` | 500  |
//! | `DiscoveryError`   | 502, or 404 for paths outside `/content/` |
//!
//! Bodies are short plain-text reasons. Internal failures never echo their
//! cause to the client.

use crate::domain::config::ConfigError;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pr_01_permissions::DenyReason;
use pr_02_auth_chain::{ChainError, SignerError};
use pr_03_upload_relay::RelayError;
use thiserror::Error;

/// Why a publish request did not reach (or did not survive) the upstream.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The auth chain is missing, malformed or does not verify.
    #[error("{0}")]
    MalformedChain(#[from] ChainError),

    /// The verified signer may not publish every claimed parcel.
    #[error("{0}")]
    Unauthorized(DenyReason),

    /// The request's own content is unusable.
    #[error("{0}")]
    MalformedUpload(String),

    /// The upstream rejected the upload or could not be reached.
    #[error("{0}")]
    Upstream(RelayError),

    /// The multipart body could not be read.
    #[error("{message}")]
    Multipart { status: StatusCode, message: String },

    /// The relay could not produce its own chain.
    #[error("relay signing failed: {0}")]
    Signing(#[from] SignerError),

    /// Staging the upload to disk failed.
    #[error("upload staging failed: {0}")]
    Staging(#[source] std::io::Error),
}

impl PublishError {
    pub fn status(&self) -> StatusCode {
        match self {
            PublishError::MalformedChain(_) | PublishError::Unauthorized(_) => {
                StatusCode::FORBIDDEN
            }
            PublishError::MalformedUpload(_) | PublishError::Upstream(_) => {
                StatusCode::BAD_REQUEST
            }
            PublishError::Multipart { status, .. } => *status,
            PublishError::Signing(_) | PublishError::Staging(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether the request got as far as the upstream.
    pub fn reached_upstream(&self) -> bool {
        matches!(self, PublishError::Upstream(_))
    }
}

impl From<RelayError> for PublishError {
    fn from(e: RelayError) -> Self {
        match e {
            RelayError::MalformedUpload(message) => PublishError::MalformedUpload(message),
            RelayError::Staging(io) => PublishError::Staging(io),
            other => PublishError::Upstream(other),
        }
    }
}

impl From<MultipartError> for PublishError {
    fn from(e: MultipartError) -> Self {
        PublishError::Multipart {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl From<std::io::Error> for PublishError {
    fn from(e: std::io::Error) -> Self {
        PublishError::Staging(e)
    }
}

impl IntoResponse for PublishError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            PublishError::Signing(_) | PublishError::Staging(_) => "Internal error".to_string(),
            other => other.to_string(),
        };
        (status, body).into_response()
    }
}

/// Discovery read refused, or failed before any upstream response arrived.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DiscoveryError(#[from] pub RelayError);

impl IntoResponse for DiscoveryError {
    fn into_response(self) -> Response {
        match self.0 {
            RelayError::ForbiddenPath(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
            _ => (StatusCode::BAD_GATEWAY, "Upstream unavailable").into_response(),
        }
    }
}

/// Gateway lifecycle errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
