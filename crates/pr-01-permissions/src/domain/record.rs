//! # Authorization Records
//!
//! One entry of the external authorization document. Records are read
//! wholesale on every refresh and never mutated.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A point in time taken from the authorization document.
///
/// The document may carry epoch milliseconds or an RFC 3339 / `YYYY-MM-DD`
/// string; both are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Millis(ms) => {
                Timestamp::from_millis(ms).ok_or_else(|| D::Error::custom("timestamp out of range"))
            }
            RawTimestamp::Float(ms) => Timestamp::from_millis(ms as i64)
                .ok_or_else(|| D::Error::custom("timestamp out of range")),
            RawTimestamp::Text(s) => parse_text_timestamp(&s)
                .ok_or_else(|| D::Error::custom(format!("unrecognised date: {s}"))),
        }
    }
}

fn parse_text_timestamp(s: &str) -> Option<Timestamp> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(Timestamp(dt.with_timezone(&Utc)));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Timestamp(Utc.from_utc_datetime(&naive)));
    }
    s.parse::<i64>().ok().and_then(Timestamp::from_millis)
}

/// Grant of a set of parcels to a set of identities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "description")]
    pub desc: String,
    #[serde(default)]
    pub start_date: Option<Timestamp>,
    #[serde(default)]
    pub end_date: Option<Timestamp>,
    #[serde(default)]
    pub contact_info: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub addresses: Vec<String>,
    #[serde(default)]
    pub plots: Vec<String>,
}

impl AuthorizationRecord {
    /// Whether `now` falls inside `[start_date, end_date]`.
    ///
    /// A missing bound is open on that side.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        let started = self.start_date.map_or(true, |start| start.0 <= now);
        let not_ended = self.end_date.map_or(true, |end| now <= end.0);
        started && not_ended
    }
}
