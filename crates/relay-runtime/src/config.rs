//! # Runtime Configuration
//!
//! Starts from `RelayConfig::default()` and applies `PR_*` environment
//! overrides. A variable that is set but does not parse is a startup error.
//!
//! | Variable               | Field                          |
//! |------------------------|--------------------------------|
//! | `PR_HOST`              | `http.host`                    |
//! | `PR_PORT`              | `http.port`                    |
//! | `PR_UPSTREAM_URL`      | `upstream.base_url`            |
//! | `CATALYST_DOMAIN`      | `upstream.base_url` as `https://<domain>` when `PR_UPSTREAM_URL` is unset |
//! | `PR_UPLOAD_TIMEOUT`    | `upstream.upload_timeout`      |
//! | `PR_DISCOVERY_TIMEOUT` | `upstream.discovery_timeout`   |
//! | `PR_UPLOAD_ORIGIN`     | `upstream.upload_origin`       |
//! | `PR_RESPONSE_POLICY`   | `upstream.response_policy`     |
//! | `PR_AUTHORIZATIONS`    | `permissions.source`           |
//! | `PR_REFRESH_INTERVAL`  | `permissions.refresh_interval` |
//! | `PR_MAX_UPLOAD_BYTES`  | `limits.max_upload_bytes`      |
//! | `PR_CORS_ORIGINS`      | `cors.allowed_origins` (comma-separated) |
//! | `PR_REALM_NAME`        | `about.realm_name`             |
//! | `PR_NETWORK_ID`        | `about.network_id`             |
//! | `PR_PUBLIC_URL`        | `about.public_url`             |
//!
//! The signing key (`PR_SIGNING_KEY`) is read separately and never stored in
//! `RelayConfig`.

use pr_04_api_gateway::{parse_duration, ConfigError, RelayConfig};
use std::fmt::Display;
use std::str::FromStr;

/// Environment variable holding the relay's hex private key.
pub const SIGNING_KEY_VAR: &str = "PR_SIGNING_KEY";

/// Environment variable selecting the log format (`json` or anything else).
pub const LOG_FORMAT_VAR: &str = "PR_LOG_FORMAT";

/// Build the configuration from the process environment.
pub fn load_config() -> Result<RelayConfig, ConfigError> {
    apply_env(RelayConfig::default(), |key| std::env::var(key).ok())
}

/// Apply overrides from `lookup` on top of `config`.
pub fn apply_env<F>(mut config: RelayConfig, lookup: F) -> Result<RelayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = var("PR_HOST") {
        config.http.host = parse("PR_HOST", &v)?;
    }
    if let Some(v) = var("PR_PORT") {
        config.http.port = parse("PR_PORT", &v)?;
    }

    match (var("PR_UPSTREAM_URL"), var("CATALYST_DOMAIN")) {
        (Some(url), _) => config.upstream.base_url = url.trim().to_string(),
        (None, Some(domain)) => config.upstream.base_url = format!("https://{}", domain.trim()),
        (None, None) => {}
    }
    if let Some(v) = var("PR_UPLOAD_TIMEOUT") {
        config.upstream.upload_timeout = duration("PR_UPLOAD_TIMEOUT", &v)?;
    }
    if let Some(v) = var("PR_DISCOVERY_TIMEOUT") {
        config.upstream.discovery_timeout = duration("PR_DISCOVERY_TIMEOUT", &v)?;
    }
    if let Some(v) = var("PR_UPLOAD_ORIGIN") {
        config.upstream.upload_origin = v.trim().to_string();
    }
    if let Some(v) = var("PR_RESPONSE_POLICY") {
        config.upstream.response_policy = parse("PR_RESPONSE_POLICY", &v)?;
    }

    if let Some(v) = var("PR_AUTHORIZATIONS") {
        config.permissions.source = v.trim().to_string();
    }
    if let Some(v) = var("PR_REFRESH_INTERVAL") {
        config.permissions.refresh_interval = duration("PR_REFRESH_INTERVAL", &v)?;
    }

    if let Some(v) = var("PR_MAX_UPLOAD_BYTES") {
        config.limits.max_upload_bytes = parse("PR_MAX_UPLOAD_BYTES", &v)?;
    }

    if let Some(v) = var("PR_CORS_ORIGINS") {
        config.cors.allowed_origins = v
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
    }

    if let Some(v) = var("PR_REALM_NAME") {
        config.about.realm_name = v.trim().to_string();
    }
    if let Some(v) = var("PR_NETWORK_ID") {
        config.about.network_id = parse("PR_NETWORK_ID", &v)?;
    }
    if let Some(v) = var("PR_PUBLIC_URL") {
        config.about.public_url = Some(v.trim().to_string());
    }

    config.validate()?;
    Ok(config)
}

fn parse<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value.trim().parse::<T>().map_err(|e| ConfigError::Parse {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn duration(key: &str, value: &str) -> Result<std::time::Duration, ConfigError> {
    parse_duration(value).map_err(|e| match e {
        ConfigError::Parse { message, .. } => ConfigError::Parse {
            key: key.to_string(),
            message,
        },
        other => other,
    })
}
