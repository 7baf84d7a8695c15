//! Composite keys for validation-request records.
//!
//! A record for `(organization, id)` captured at `timestamp` lives under
//! `organization:id:timestamp`. The timestamp is fixed-width ISO-8601 in UTC,
//! so under a shared `organization:id:` prefix lexicographic key order is
//! capture order.

use chrono::{DateTime, SecondsFormat, Utc};

pub const DELIMITER: char = ':';

/// Prefix shared by every record of an organization
pub fn organization_prefix(organization: &str) -> String {
    format!("{organization}{DELIMITER}")
}

/// Prefix shared by every record of one id within an organization
pub fn request_prefix(organization: &str, id: &str) -> String {
    format!("{organization}{DELIMITER}{id}{DELIMITER}")
}

/// ISO-8601 capture timestamp, e.g. `2024-05-01T12:30:00.123Z`
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn record_key(organization: &str, id: &str, timestamp: &str) -> String {
    format!("{}{timestamp}", request_prefix(organization, id))
}

/// Most recent key of a prefix listing.
///
/// Picks the greatest key instead of trusting the listing's position, so a
/// store that returns keys unordered still yields the same answer.
pub fn latest<I>(keys: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    keys.into_iter().max()
}
