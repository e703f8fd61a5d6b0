//! Validated create/read/update/delete over a [`Store`].

use crate::{
    consumption,
    domain::{
        Meter, MeterId, MeterPatch, NewMeter, NewProvider, NewUser, Provider, ProviderId,
        ProviderPatch, Reading, User, UserId, UserPatch,
    },
    error::{BillingError, EntityKind, Result},
    query::{self, PageRequest, ReadingFilter},
    store::Store,
    validate,
};

pub fn register_user<S: Store + ?Sized>(store: &mut S, new: NewUser) -> Result<User> {
    validate::new_user(&new)?;
    Ok(store.create_user(new))
}

pub fn user<S: Store + ?Sized>(store: &S, id: UserId) -> Result<User> {
    validate::require_id(EntityKind::User, id)?;
    store
        .user(id)
        .ok_or_else(|| BillingError::not_found(EntityKind::User, id))
}

pub fn list_users<S: Store + ?Sized>(store: &S, page: PageRequest, page_size: usize) -> Vec<User> {
    query::paginate(store.users(), page, page_size)
}

pub fn update_user<S: Store + ?Sized>(store: &mut S, id: UserId, patch: &UserPatch) -> Result<User> {
    validate::require_id(EntityKind::User, id)?;
    store
        .update_user(id, patch)
        .ok_or_else(|| BillingError::not_found(EntityKind::User, id))
}

/// Meters owned by the user are left in place.
pub fn remove_user<S: Store + ?Sized>(store: &mut S, id: UserId) -> Result<()> {
    validate::require_id(EntityKind::User, id)?;
    if store.delete_user(id) {
        Ok(())
    } else {
        Err(BillingError::not_found(EntityKind::User, id))
    }
}

pub fn create_provider<S: Store + ?Sized>(store: &mut S, new: NewProvider) -> Result<Provider> {
    validate::new_provider(&new)?;
    Ok(store.create_provider(new))
}

pub fn list_providers<S: Store + ?Sized>(store: &S) -> Vec<Provider> {
    store.providers()
}

pub fn provider<S: Store + ?Sized>(store: &S, id: ProviderId) -> Result<Provider> {
    validate::require_id(EntityKind::Provider, id)?;
    store
        .provider(id)
        .ok_or_else(|| BillingError::not_found(EntityKind::Provider, id))
}

pub fn update_provider<S: Store + ?Sized>(
    store: &mut S,
    id: ProviderId,
    patch: &ProviderPatch,
) -> Result<Provider> {
    validate::require_id(EntityKind::Provider, id)?;
    validate::provider_patch(patch)?;
    store
        .update_provider(id, patch)
        .ok_or_else(|| BillingError::not_found(EntityKind::Provider, id))
}

/// Subscribers keep pointing at the deleted id; billing them reports a
/// dangling subscription.
pub fn remove_provider<S: Store + ?Sized>(store: &mut S, id: ProviderId) -> Result<()> {
    validate::require_id(EntityKind::Provider, id)?;
    if store.delete_provider(id) {
        Ok(())
    } else {
        Err(BillingError::not_found(EntityKind::Provider, id))
    }
}

pub fn install_meter<S: Store + ?Sized>(store: &mut S, new: NewMeter) -> Result<Meter> {
    validate::new_meter(&new)?;
    if !store.user_exists(new.user_id) {
        return Err(BillingError::not_found(EntityKind::User, new.user_id));
    }
    Ok(store.create_meter(new))
}

pub fn meter<S: Store + ?Sized>(store: &S, id: MeterId) -> Result<Meter> {
    validate::require_id(EntityKind::Meter, id)?;
    store
        .meter(id)
        .ok_or_else(|| BillingError::not_found(EntityKind::Meter, id))
}

pub fn update_meter<S: Store + ?Sized>(
    store: &mut S,
    id: MeterId,
    patch: &MeterPatch,
) -> Result<Meter> {
    validate::require_id(EntityKind::Meter, id)?;
    store
        .update_meter(id, patch)
        .ok_or_else(|| BillingError::not_found(EntityKind::Meter, id))
}

/// The meter's readings go with it and stop counting towards any bill.
pub fn remove_meter<S: Store + ?Sized>(store: &mut S, id: MeterId) -> Result<()> {
    validate::require_id(EntityKind::Meter, id)?;
    if store.delete_meter(id) {
        Ok(())
    } else {
        Err(BillingError::not_found(EntityKind::Meter, id))
    }
}

pub fn record_reading<S: Store + ?Sized>(
    store: &mut S,
    meter_id: MeterId,
    reading: Reading,
) -> Result<Reading> {
    validate::require_id(EntityKind::Meter, meter_id)?;
    validate::reading(&reading)?;
    store
        .append_reading(meter_id, reading)
        .ok_or_else(|| BillingError::not_found(EntityKind::Meter, meter_id))
}

pub fn meter_readings<S: Store + ?Sized>(
    store: &S,
    meter_id: MeterId,
    filter: &ReadingFilter,
) -> Result<Vec<Reading>> {
    let meter = meter(store, meter_id)?;
    Ok(consumption::readings(std::slice::from_ref(&meter))
        .filter(|r| filter.matches(r))
        .copied()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use time::macros::datetime;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.into(),
            email: format!("{name}@example.com"),
            fullname: name.into(),
        }
    }

    #[test]
    fn invalid_registration_creates_nothing() {
        let mut store = MemoryStore::new();
        let err = register_user(&mut store, NewUser::default()).unwrap_err();
        assert!(matches!(err, BillingError::InvalidInput(_)));
        assert!(store.users().is_empty());
        assert_eq!(register_user(&mut store, new_user("a")).unwrap().id, 1);
    }

    #[test]
    fn meter_requires_existing_owner() {
        let mut store = MemoryStore::new();
        let err = install_meter(
            &mut store,
            NewMeter {
                user_id: 4,
                name: "m".into(),
            },
        )
        .unwrap_err();
        assert_eq!(err, BillingError::not_found(EntityKind::User, 4));
    }

    #[test]
    fn reading_on_missing_meter_is_not_found() {
        let mut store = MemoryStore::new();
        let reading = Reading::new(1.0, datetime!(2024-01-01 00:00:00 UTC));
        let err = record_reading(&mut store, 3, reading).unwrap_err();
        assert_eq!(err, BillingError::not_found(EntityKind::Meter, 3));
    }

    #[test]
    fn invalid_reading_is_rejected_before_lookup() {
        let mut store = MemoryStore::new();
        let reading = Reading::new(-5.0, datetime!(2024-01-01 00:00:00 UTC));
        let err = record_reading(&mut store, 3, reading).unwrap_err();
        assert!(matches!(err, BillingError::InvalidInput(_)));
    }

    #[test]
    fn provider_patch_rejects_negative_charge() {
        let mut store = MemoryStore::with_providers([NewProvider::new("Electro", 5.0)]);
        let patch = ProviderPatch {
            charge: Some(-1.0),
            ..Default::default()
        };
        assert!(update_provider(&mut store, 1, &patch).is_err());
        assert_eq!(store.provider(1).unwrap().charge, 5.0);
    }

    #[test]
    fn meter_readings_apply_filter() {
        let mut store = MemoryStore::new();
        let user = register_user(&mut store, new_user("a")).unwrap();
        let meter = install_meter(
            &mut store,
            NewMeter {
                user_id: user.id,
                name: "m".into(),
            },
        )
        .unwrap();
        for (units, ts) in [
            (1.0, datetime!(2024-01-01 00:00:00 UTC)),
            (2.0, datetime!(2024-02-01 00:00:00 UTC)),
        ] {
            record_reading(&mut store, meter.id, Reading::new(units, ts)).unwrap();
        }
        let filter = ReadingFilter::Since(datetime!(2024-01-15 00:00:00 UTC));
        let readings = meter_readings(&store, meter.id, &filter).unwrap();
        assert_eq!(readings, vec![Reading::new(2.0, datetime!(2024-02-01 00:00:00 UTC))]);
    }

    #[test]
    fn removed_meter_is_gone_and_ids_move_on() {
        let mut store = MemoryStore::new();
        let user = register_user(&mut store, new_user("a")).unwrap();
        let new_meter = || NewMeter {
            user_id: user.id,
            name: "m".into(),
        };
        let meter = install_meter(&mut store, new_meter()).unwrap();
        remove_meter(&mut store, meter.id).unwrap();

        assert_eq!(
            remove_meter(&mut store, meter.id).unwrap_err(),
            BillingError::not_found(EntityKind::Meter, meter.id)
        );
        assert_eq!(
            update_meter(&mut store, meter.id, &MeterPatch::default()).unwrap_err(),
            BillingError::not_found(EntityKind::Meter, meter.id)
        );
        assert!(matches!(
            remove_meter(&mut store, 0).unwrap_err(),
            BillingError::InvalidInput(_)
        ));
        assert_eq!(install_meter(&mut store, new_meter()).unwrap().id, meter.id + 1);
    }
}
