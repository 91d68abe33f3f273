//! Domain types for the relay gateway: configuration, errors and the realm
//! descriptor. No I/O.

pub mod about;
pub mod config;
pub mod error;

pub use about::about_document;
pub use config::{
    parse_duration, AboutConfig, ConfigError, CorsConfig, HttpConfig, LimitsConfig,
    PermissionsConfig, RelayConfig, UpstreamConfig,
};
pub use error::{DiscoveryError, GatewayError, PublishError};
