//! # Outbound Ports (Driven Ports / SPI)
//!
//! Where authorization records come from.

use crate::domain::errors::SourceError;
use crate::domain::record::AuthorizationRecord;

/// A source of the full authorization document.
///
/// Every call returns the complete record list; records are replaced, never
/// merged.
#[async_trait::async_trait]
pub trait AuthorizationSource: Send + Sync {
    /// Fetch and decode the current document.
    async fn fetch(&self) -> Result<Vec<AuthorizationRecord>, SourceError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}
