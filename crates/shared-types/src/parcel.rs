//! # Parcel Coordinates
//!
//! A parcel is one cell of the bounded world map, addressed as `"x,y"`.

use crate::errors::ParcelError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Smallest valid coordinate on either axis.
pub const PARCEL_MIN: i16 = -200;

/// Largest valid coordinate on either axis.
pub const PARCEL_MAX: i16 = 200;

/// A validated parcel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParcelCoord {
    pub x: i16,
    pub y: i16,
}

impl ParcelCoord {
    /// Build a coordinate, checking both axes against the map bounds.
    pub fn new(x: i64, y: i64) -> Result<Self, ParcelError> {
        Ok(Self {
            x: check_axis(x)?,
            y: check_axis(y)?,
        })
    }

    /// Whether `s` parses as a valid coordinate.
    pub fn is_valid(s: &str) -> bool {
        s.parse::<Self>().is_ok()
    }
}

fn check_axis(value: i64) -> Result<i16, ParcelError> {
    if value < i64::from(PARCEL_MIN) || value > i64::from(PARCEL_MAX) {
        return Err(ParcelError::OutOfRange {
            value,
            min: PARCEL_MIN,
            max: PARCEL_MAX,
        });
    }
    Ok(value as i16)
}

fn parse_axis(part: &str) -> Result<i64, ParcelError> {
    part.trim()
        .parse::<i64>()
        .map_err(|_| ParcelError::NotAnInteger(part.to_string()))
}

impl FromStr for ParcelCoord {
    type Err = ParcelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 2 {
            return Err(ParcelError::WrongArity { parts: parts.len() });
        }
        Self::new(parse_axis(parts[0])?, parse_axis(parts[1])?)
    }
}

impl fmt::Display for ParcelCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl Serialize for ParcelCoord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ParcelCoord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
