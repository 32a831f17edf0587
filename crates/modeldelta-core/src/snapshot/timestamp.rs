//! Timestamp parsing for persisted documents.
//!
//! Files written by other tools carry either RFC 3339 timestamps or naive
//! ISO-8601 local times without an offset. Naive times are taken as UTC.

use crate::errors::SnapshotError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Parse an RFC 3339 or naive ISO-8601 timestamp.
///
/// # Errors
///
/// Returns [`SnapshotError::InvalidTimestamp`] if neither format matches.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, SnapshotError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| SnapshotError::InvalidTimestamp {
            value: value.to_string(),
        })
}

/// Serde adapter: serialize as RFC 3339, deserialize with [`parse_timestamp`].
pub mod lenient {
    use super::*;
    use serde::Serializer;

    /// # Errors
    ///
    /// Propagates the serializer's error.
    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339())
    }

    /// # Errors
    ///
    /// Fails if the string is neither RFC 3339 nor naive ISO-8601.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
