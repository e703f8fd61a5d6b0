use crate::{
    domain::{Meter, Reading, UserId},
    error::{BillingError, Result},
    query::{DateRange, ReadingFilter},
    store::Store,
};

/// Every reading across every meter, in meter order then append order.
pub fn readings(meters: &[Meter]) -> impl Iterator<Item = &Reading> + '_ {
    meters.iter().flat_map(|m| m.readings.iter())
}

/// Sum of reading units across `meters`, optionally restricted to `range`.
///
/// Units are added in ascending order so the total does not depend on how
/// meters or readings happen to be ordered.
pub fn total_units(meters: &[Meter], range: Option<&DateRange>) -> f64 {
    let mut units: Vec<f64> = readings(meters)
        .filter(|r| range.map_or(true, |range| range.contains(r.time)))
        .map(|r| r.units)
        .collect();
    units.sort_by(f64::total_cmp);
    units.into_iter().fold(0.0, |acc, u| acc + u)
}

/// All readings of all meters owned by `user_id`.
pub fn user_readings<S>(store: &S, user_id: UserId, filter: &ReadingFilter) -> Result<Vec<Reading>>
where
    S: Store + ?Sized,
{
    let meters = store.meters_for_user(user_id);
    if meters.is_empty() {
        return Err(BillingError::NoMeters { user_id });
    }
    Ok(readings(&meters).filter(|r| filter.matches(r)).copied().collect())
}
