use std::collections::BTreeMap;

use crate::domain::{
    Meter, MeterId, MeterPatch, NewMeter, NewProvider, NewUser, Provider, ProviderId,
    ProviderPatch, Reading, User, UserId, UserPatch,
};

use super::Store;

/// Per-kind identifier counter. Starts at 1 and never hands out an id twice,
/// even after the entity holding it is deleted.
#[derive(Debug, Clone)]
struct IdSequence {
    next: u64,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdSequence {
    fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Process-local store. Lives from startup to shutdown; callers that share it
/// across tasks wrap it in a mutex.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    users: BTreeMap<UserId, User>,
    providers: BTreeMap<ProviderId, Provider>,
    meters: BTreeMap<MeterId, Meter>,
    user_ids: IdSequence,
    provider_ids: IdSequence,
    meter_ids: IdSequence,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with providers, numbered from 1 in order.
    pub fn with_providers<I>(providers: I) -> Self
    where
        I: IntoIterator<Item = NewProvider>,
    {
        let mut store = Self::new();
        for provider in providers {
            store.create_provider(provider);
        }
        store
    }
}

impl Store for MemoryStore {
    fn create_user(&mut self, new: NewUser) -> User {
        let user = User::from_new(self.user_ids.next_id(), new);
        self.users.insert(user.id, user.clone());
        user
    }

    fn user(&self, id: UserId) -> Option<User> {
        self.users.get(&id).cloned()
    }

    fn users(&self) -> Vec<User> {
        self.users.values().cloned().collect()
    }

    fn update_user(&mut self, id: UserId, patch: &UserPatch) -> Option<User> {
        let user = self.users.get_mut(&id)?;
        patch.apply_to(user);
        Some(user.clone())
    }

    fn delete_user(&mut self, id: UserId) -> bool {
        self.users.remove(&id).is_some()
    }

    fn set_subscription(&mut self, id: UserId, provider_id: ProviderId) -> Option<User> {
        let user = self.users.get_mut(&id)?;
        user.subscribed_provider = Some(provider_id);
        Some(user.clone())
    }

    fn create_provider(&mut self, new: NewProvider) -> Provider {
        let provider = Provider::from_new(self.provider_ids.next_id(), new);
        self.providers.insert(provider.id, provider.clone());
        provider
    }

    fn provider(&self, id: ProviderId) -> Option<Provider> {
        self.providers.get(&id).cloned()
    }

    fn providers(&self) -> Vec<Provider> {
        self.providers.values().cloned().collect()
    }

    fn update_provider(&mut self, id: ProviderId, patch: &ProviderPatch) -> Option<Provider> {
        let provider = self.providers.get_mut(&id)?;
        patch.apply_to(provider);
        Some(provider.clone())
    }

    fn delete_provider(&mut self, id: ProviderId) -> bool {
        self.providers.remove(&id).is_some()
    }

    fn create_meter(&mut self, new: NewMeter) -> Meter {
        let meter = Meter::from_new(self.meter_ids.next_id(), new);
        self.meters.insert(meter.id, meter.clone());
        meter
    }

    fn meter(&self, id: MeterId) -> Option<Meter> {
        self.meters.get(&id).cloned()
    }

    fn update_meter(&mut self, id: MeterId, patch: &MeterPatch) -> Option<Meter> {
        let meter = self.meters.get_mut(&id)?;
        patch.apply_to(meter);
        Some(meter.clone())
    }

    fn delete_meter(&mut self, id: MeterId) -> bool {
        self.meters.remove(&id).is_some()
    }

    fn meters_for_user(&self, user_id: UserId) -> Vec<Meter> {
        self.meters
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect()
    }

    fn append_reading(&mut self, meter_id: MeterId, reading: Reading) -> Option<Reading> {
        let meter = self.meters.get_mut(&meter_id)?;
        meter.readings.push(reading);
        Some(reading)
    }
}
