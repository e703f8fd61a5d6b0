//! Date filtering of readings and offset pagination of listings.

use time::{Duration, OffsetDateTime};

use crate::{
    domain::{
        timestamp::{self, Bound},
        Reading,
    },
    error::{BillingError, Result},
};

/// Inclusive `[start, end]` window over reading timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DateRange {
    #[cfg_attr(
        feature = "serde",
        serde(rename = "startDate", serialize_with = "timestamp::serialize")
    )]
    pub start: OffsetDateTime,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "endDate", serialize_with = "timestamp::serialize")
    )]
    pub end: OffsetDateTime,
}

impl DateRange {
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Result<Self> {
        if start > end {
            return Err(BillingError::invalid("startDate must not be after endDate"));
        }
        Ok(Self { start, end })
    }

    /// Builds a range from raw query parameters.
    ///
    /// Both bounds or neither: a lone bound is rejected rather than read as
    /// open-ended.
    pub fn from_params(start: Option<&str>, end: Option<&str>) -> Result<Option<Self>> {
        match (start, end) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => {
                let start = timestamp::parse_bound(start, Bound::Start)?;
                let end = timestamp::parse_bound(end, Bound::End)?;
                Self::new(start, end).map(Some)
            }
            _ => Err(BillingError::invalid(
                "startDate and endDate must be supplied together",
            )),
        }
    }

    pub fn contains(&self, ts: OffsetDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Start of a lookback window of `days` days ending at `now`, or `None` when
/// the window reaches past the earliest representable instant.
pub fn lookback_cutoff(now: OffsetDateTime, days: u32) -> Option<OffsetDateTime> {
    now.checked_sub(Duration::days(i64::from(days)))
}

/// Which readings a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadingFilter {
    #[default]
    All,
    /// On or after the cutoff.
    Since(OffsetDateTime),
    Within(DateRange),
}

impl ReadingFilter {
    /// Resolves `?days=` or `?startDate=&endDate=` into a filter. The two
    /// forms are mutually exclusive.
    pub fn from_params(
        days: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<Self> {
        let range = DateRange::from_params(start, end)?;
        match (days, range) {
            (Some(_), Some(_)) => Err(BillingError::invalid(
                "days cannot be combined with startDate/endDate",
            )),
            (Some(days), None) => {
                let days: u32 = days.trim().parse().map_err(|_| {
                    BillingError::invalid(format!("days must be a non-negative integer, got '{days}'"))
                })?;
                Ok(lookback_cutoff(now, days).map_or(Self::All, Self::Since))
            }
            (None, Some(range)) => Ok(Self::Within(range)),
            (None, None) => Ok(Self::All),
        }
    }

    pub fn matches(&self, reading: &Reading) -> bool {
        match self {
            Self::All => true,
            Self::Since(cutoff) => reading.time >= *cutoff,
            Self::Within(range) => range.contains(reading.time),
        }
    }
}

/// A 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest(u64);

impl Default for PageRequest {
    fn default() -> Self {
        Self(1)
    }
}

impl PageRequest {
    /// Pages below 1 are clamped to 1.
    pub fn new(page: u64) -> Self {
        Self(page.max(1))
    }

    /// Missing or non-numeric input means the first page.
    pub fn from_param(raw: Option<&str>) -> Self {
        raw.and_then(|v| v.trim().parse::<i64>().ok())
            .map(|page| Self::new(page.max(1) as u64))
            .unwrap_or_default()
    }

    pub fn number(&self) -> u64 {
        self.0
    }

    pub fn offset(&self, page_size: usize) -> usize {
        usize::try_from(self.0 - 1)
            .unwrap_or(usize::MAX)
            .saturating_mul(page_size)
    }
}

/// Slice of a stable-ordered listing. Pages past the end are empty.
pub fn paginate<T, I>(items: I, page: PageRequest, page_size: usize) -> Vec<T>
where
    I: IntoIterator<Item = T>,
{
    items
        .into_iter()
        .skip(page.offset(page_size))
        .take(page_size)
        .collect()
}
