use crate::{
    domain::{Provider, ProviderId, User, UserId},
    error::{BillingError, EntityKind, Result},
    store::Store,
    validate,
};

/// Points `user_id` at `provider_id`, replacing any previous subscription.
///
/// Both ids must exist at call time; nothing is written otherwise.
pub fn subscribe<S>(store: &mut S, user_id: UserId, provider_id: ProviderId) -> Result<User>
where
    S: Store + ?Sized,
{
    validate::require_id(EntityKind::User, user_id)?;
    validate::require_id(EntityKind::Provider, provider_id)?;

    if !store.user_exists(user_id) {
        return Err(BillingError::not_found(EntityKind::User, user_id));
    }
    if !store.provider_exists(provider_id) {
        return Err(BillingError::not_found(EntityKind::Provider, provider_id));
    }

    store
        .set_subscription(user_id, provider_id)
        .ok_or_else(|| BillingError::not_found(EntityKind::User, user_id))
}

/// The provider a user is billed by.
pub fn resolve_provider<S>(store: &S, user: &User) -> Result<Provider>
where
    S: Store + ?Sized,
{
    let provider_id = user
        .subscribed_provider
        .ok_or(BillingError::NotSubscribed { user_id: user.id })?;

    store
        .provider(provider_id)
        .ok_or(BillingError::DanglingSubscription {
            user_id: user.id,
            provider_id,
        })
}
