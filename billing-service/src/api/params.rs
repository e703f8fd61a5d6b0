//! Query strings shared by the user and meter routes.

use billing_core::{BillingError, ReadingFilter};
use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// `?days=` or `?startDate=&endDate=`, never both.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingParams {
    pub days: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ReadingParams {
    pub fn filter(&self, now: OffsetDateTime) -> Result<ReadingFilter, BillingError> {
        ReadingFilter::from_params(
            self.days.as_deref(),
            self.start_date.as_deref(),
            self.end_date.as_deref(),
            now,
        )
    }
}
