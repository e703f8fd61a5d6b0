use crate::{
    consumption,
    domain::{ProviderId, UserId},
    error::{BillingError, EntityKind, Result},
    query::DateRange,
    store::Store,
    subscription, validate,
};

/// A computed bill. `period` is echoed back when the bill was windowed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Bill {
    pub user_id: UserId,
    pub provider_id: ProviderId,
    pub total_units: f64,
    pub amount: f64,
    #[cfg_attr(feature = "serde", serde(flatten, skip_serializing_if = "Option::is_none"))]
    pub period: Option<DateRange>,
}

/// Bills `user_id` for everything their meters recorded, or only what falls
/// inside `range`.
///
/// Fails without an amount when the user is unknown, has no live
/// subscription or owns no meters. A total that overflows `f64` is
/// rejected as invalid input.
pub fn bill<S>(store: &S, user_id: UserId, range: Option<DateRange>) -> Result<Bill>
where
    S: Store + ?Sized,
{
    validate::require_id(EntityKind::User, user_id)?;

    let user = store
        .user(user_id)
        .ok_or_else(|| BillingError::not_found(EntityKind::User, user_id))?;
    let provider = subscription::resolve_provider(store, &user)?;

    let meters = store.meters_for_user(user_id);
    if meters.is_empty() {
        return Err(BillingError::NoMeters { user_id });
    }

    let total_units = consumption::total_units(&meters, range.as_ref());
    let amount = total_units * provider.charge;
    if !total_units.is_finite() || !amount.is_finite() {
        return Err(BillingError::invalid(format!(
            "consumption of user {user_id} is too large to bill"
        )));
    }

    Ok(Bill {
        user_id,
        provider_id: provider.id,
        total_units,
        amount,
        period: range,
    })
}
