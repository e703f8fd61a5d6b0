//! Input checks run before any store lookup.

use time::macros::datetime;

use crate::{
    domain::{NewMeter, NewProvider, NewUser, ProviderPatch, Reading},
    error::{BillingError, EntityKind, Result},
};

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BillingError::invalid(format!("{field} must not be blank")));
    }
    Ok(())
}

fn require_charge(charge: f64) -> Result<()> {
    if !charge.is_finite() || charge < 0.0 {
        return Err(BillingError::invalid(
            "charge must be a non-negative number",
        ));
    }
    Ok(())
}

/// Identifiers are assigned from 1 upwards, so zero can never match.
pub fn require_id(kind: EntityKind, id: u64) -> Result<()> {
    if id == 0 {
        return Err(BillingError::invalid(format!(
            "{kind} id must be a positive integer"
        )));
    }
    Ok(())
}

pub fn new_user(new: &NewUser) -> Result<()> {
    require_text("username", &new.username)?;
    require_text("email", &new.email)?;
    require_text("fullname", &new.fullname)
}

pub fn new_provider(new: &NewProvider) -> Result<()> {
    require_text("name", &new.name)?;
    require_charge(new.charge)
}

pub fn provider_patch(patch: &ProviderPatch) -> Result<()> {
    match patch.charge {
        Some(charge) => require_charge(charge),
        None => Ok(()),
    }
}

pub fn new_meter(new: &NewMeter) -> Result<()> {
    require_id(EntityKind::User, new.user_id)?;
    require_text("name", &new.name)
}

/// Rules:
/// - units must be a finite, non-negative number.
/// - time must be within a broad sanity window [2000-01-01, 2100-01-01].
pub fn reading(reading: &Reading) -> Result<()> {
    if !reading.units.is_finite() || reading.units < 0.0 {
        return Err(BillingError::invalid("units must be a non-negative number"));
    }

    let min_ts = datetime!(2000-01-01 00:00:00 UTC);
    let max_ts = datetime!(2100-01-01 00:00:00 UTC);

    if reading.time < min_ts || reading.time > max_ts {
        return Err(BillingError::invalid("reading time out of allowed range"));
    }

    Ok(())
}
