//! # Response Narrowing
//!
//! Deployment policy for what part of the upstream's success body reaches
//! the client.

use crate::domain::upstream::UpstreamResponse;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsePolicy {
    /// Return the upstream body unchanged.
    #[default]
    Passthrough,
    /// Return only `{"creationTimestamp": …}`.
    CreationTimestamp,
}

impl ResponsePolicy {
    /// Apply the policy to a successful upstream response.
    ///
    /// A body that is not a JSON object carrying `creationTimestamp` is
    /// returned unchanged.
    pub fn apply(&self, response: UpstreamResponse) -> UpstreamResponse {
        match self {
            ResponsePolicy::Passthrough => response,
            ResponsePolicy::CreationTimestamp => {
                let timestamp = serde_json::from_slice::<serde_json::Value>(&response.body)
                    .ok()
                    .and_then(|body| body.get("creationTimestamp").cloned());
                match timestamp {
                    Some(ts) => UpstreamResponse::json(
                        response.status,
                        &serde_json::json!({ "creationTimestamp": ts }),
                    ),
                    None => {
                        debug!("Upstream body has no creationTimestamp, passing through");
                        response
                    }
                }
            }
        }
    }
}

impl fmt::Display for ResponsePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponsePolicy::Passthrough => f.write_str("passthrough"),
            ResponsePolicy::CreationTimestamp => f.write_str("creation_timestamp"),
        }
    }
}

impl FromStr for ResponsePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "passthrough" => Ok(ResponsePolicy::Passthrough),
            "creation_timestamp" => Ok(ResponsePolicy::CreationTimestamp),
            other => Err(format!("unknown response policy {other:?}")),
        }
    }
}
