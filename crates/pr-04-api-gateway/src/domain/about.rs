//! Realm descriptor served at `GET /about`.
//!
//! The relay presents itself as a minimal realm: content and lambdas are
//! reachable under its own origin, comms are offline, and there is no BFF.

use crate::domain::config::AboutConfig;
use serde_json::{json, Value};

/// Build the descriptor for a request that arrived with `host`.
///
/// `host` is the raw `Host` header; any port is kept so the advertised URLs
/// stay reachable. A configured `public_url` takes precedence.
pub fn about_document(config: &AboutConfig, host: Option<&str>) -> Value {
    let origin = public_origin(config, host);

    json!({
        "acceptingUsers": true,
        "bff": {
            "healthy": false,
            "publicUrl": format!("{origin}/bff"),
        },
        "comms": {
            "healthy": true,
            "protocol": "v3",
            "fixedAdapter": "offline:offline",
        },
        "configurations": {
            "networkId": config.network_id,
            "globalScenesUrn": [],
            "scenesUrn": [],
            "realmName": config.realm_name,
        },
        "content": {
            "healthy": true,
            "publicUrl": format!("{origin}/content"),
        },
        "lambdas": {
            "healthy": true,
            "publicUrl": format!("{origin}/lambdas"),
        },
        "healthy": true,
    })
}

fn public_origin(config: &AboutConfig, host: Option<&str>) -> String {
    match (&config.public_url, host) {
        (Some(url), _) => url.trim_end_matches('/').to_string(),
        (None, Some(host)) if !host.is_empty() => host.to_string(),
        _ => "localhost".to_string(),
    }
}
