//! # Error Types
//!
//! Parse errors for the shared value types.

use thiserror::Error;

/// Errors produced when parsing a parcel coordinate string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParcelError {
    /// The string did not contain exactly two comma-separated parts.
    #[error("expected two comma-separated coordinates, got {parts}")]
    WrongArity { parts: usize },

    /// One of the parts is not an integer.
    #[error("coordinate is not an integer: {0:?}")]
    NotAnInteger(String),

    /// A coordinate lies outside the map bounds.
    #[error("coordinate {value} outside [{min}, {max}]")]
    OutOfRange { value: i64, min: i16, max: i16 },
}

/// Errors produced when parsing a signer address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Wrong number of hex characters after the optional `0x` prefix.
    #[error("invalid address length: expected 40 hex chars, got {0}")]
    InvalidLength(usize),

    /// Non-hex characters present.
    #[error("invalid address hex: {0}")]
    InvalidHex(String),
}

/// Errors produced when decoding an entity document.
#[derive(Debug, Error)]
pub enum EntityError {
    /// The document is not valid JSON or lacks the `pointers` array.
    #[error("invalid entity document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}
