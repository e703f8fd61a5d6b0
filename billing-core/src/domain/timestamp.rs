//! Parsing of the timestamps accepted on the wire.
//!
//! Readings and range boundaries may be given as a full RFC 3339 timestamp, a
//! naive `YYYY-MM-DDTHH:MM:SS` (taken as UTC) or a bare calendar date.

use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime,
};

use crate::error::BillingError;

/// Which end of a range a date-only value stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw, format_description!("[year]-[month]-[day]")).ok()
}

fn parse_datetime(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(ts);
    }
    PrimitiveDateTime::parse(
        raw,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
    .ok()
    .map(PrimitiveDateTime::assume_utc)
}

/// Parses a point in time. A bare date means midnight UTC of that day.
pub fn parse_instant(raw: &str) -> Result<OffsetDateTime, BillingError> {
    parse_bound(raw, Bound::Start)
}

/// Parses a range boundary. A bare date expands to the first (start) or last
/// (end) nanosecond of that day, so `2024-01-15` as an end bound includes
/// everything recorded on the 15th.
pub fn parse_bound(raw: &str, bound: Bound) -> Result<OffsetDateTime, BillingError> {
    let raw = raw.trim();
    if let Some(ts) = parse_datetime(raw) {
        return Ok(ts);
    }
    let date = parse_date(raw)
        .ok_or_else(|| BillingError::invalid(format!("invalid date or timestamp '{raw}'")))?;
    let ts = match bound {
        Bound::Start => date.midnight(),
        Bound::End => date
            .with_hms_nano(23, 59, 59, 999_999_999)
            .map_err(|e| BillingError::invalid(format!("invalid end of day for '{raw}': {e}")))?,
    };
    Ok(ts.assume_utc())
}

#[cfg(feature = "serde")]
pub fn serialize<S>(ts: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let formatted = ts.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}

#[cfg(feature = "serde")]
pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
    parse_instant(&raw).map_err(serde::de::Error::custom)
}
