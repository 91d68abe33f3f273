//! Configuration for the relay gateway.
//!
//! Every section has a serde default so a partial file (or none at all)
//! yields a runnable configuration. `validate()` is called once at startup.

use pr_03_upload_relay::ResponsePolicy;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    pub http: HttpConfig,
    pub upstream: UpstreamConfig,
    pub permissions: PermissionsConfig,
    pub limits: LimitsConfig,
    pub cors: CorsConfig,
    pub about: AboutConfig,
}

impl RelayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.upstream.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "upstream base_url must be http(s), got {:?}",
                self.upstream.base_url
            )));
        }

        if self.upstream.upload_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "upload_timeout must be non-zero".into(),
            ));
        }
        if self.upstream.discovery_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "discovery_timeout must be non-zero".into(),
            ));
        }

        if self.upstream.upload_origin.is_empty()
            || !self
                .upstream
                .upload_origin
                .bytes()
                .all(|b| b.is_ascii_graphic())
        {
            return Err(ConfigError::Invalid(
                "upload_origin must be a non-empty visible ASCII token".into(),
            ));
        }

        if self.permissions.source.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "permissions source must not be empty".into(),
            ));
        }
        if self.permissions.refresh_interval.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "refresh_interval must be non-zero".into(),
            ));
        }
        if self.permissions.fetch_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "fetch_timeout must be non-zero".into(),
            ));
        }

        if self.limits.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_upload_bytes must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Address the HTTP server binds to.
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// Listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
        }
    }
}

/// The content store every publish and discovery read is forwarded to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Origin of the upstream, e.g. `https://peer.decentraland.org`.
    pub base_url: String,
    #[serde(with = "humantime_serde")]
    pub upload_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub discovery_timeout: Duration,
    /// Value of the `x-upload-origin` header on outbound publishes.
    pub upload_origin: String,
    pub response_policy: ResponsePolicy,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://peer.decentraland.org".to_string(),
            upload_timeout: Duration::from_secs(600),
            discovery_timeout: Duration::from_secs(30),
            upload_origin: "dcl_linker".to_string(),
            response_policy: ResponsePolicy::default(),
        }
    }
}

/// Where the authorization table comes from and how often it is reloaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionsConfig {
    /// Local file path or `http(s)://` URL.
    pub source: String,
    #[serde(with = "humantime_serde")]
    pub refresh_interval: Duration,
    /// Only used for URL sources.
    #[serde(with = "humantime_serde")]
    pub fetch_timeout: Duration,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            source: "./authorizations.json".to_string(),
            refresh_interval: Duration::from_secs(600),
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum publish request body in bytes.
    pub max_upload_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 512 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
        }
    }
}

/// Values reported by `GET /about`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AboutConfig {
    pub realm_name: String,
    pub network_id: u64,
    /// Public origin advertised in the descriptor. Derived from the request's
    /// `Host` header when unset.
    pub public_url: Option<String>,
}

impl Default for AboutConfig {
    fn default() -> Self {
        Self {
            realm_name: "LinkerServer".to_string(),
            network_id: 0,
            public_url: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// Value that could not be parsed from its textual form
    #[error("invalid value for {key}: {message}")]
    Parse { key: String, message: String },
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Parse a human-readable duration such as `10m`, `30s`, `500ms`, `1h` or a
/// plain number of seconds.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    humantime_serde::parse_duration(s).map_err(|message| ConfigError::Parse {
        key: "duration".into(),
        message: format!("{message}: {s:?}"),
    })
}

/// Humantime serde module for Duration serialization
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() != 0 {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        } else {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        // `ms` must be tried before `s` and `m`.
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .ok()
                .and_then(|m| m.checked_mul(60))
                .map(Duration::from_secs)
                .ok_or("invalid minutes")
        } else if let Some(hours) = s.strip_suffix('h') {
            hours
                .trim()
                .parse::<u64>()
                .ok()
                .and_then(|h| h.checked_mul(3600))
                .map(Duration::from_secs)
                .ok_or("invalid hours")
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}
