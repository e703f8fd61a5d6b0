//! Entity storage.
//!
//! [`Store`] is the seam between the billing rules and wherever users,
//! providers and meters actually live. Lookups return `None` when nothing
//! matches; turning that into a [`BillingError`](crate::BillingError) is the
//! caller's job. Listings are ordered by ascending id.

pub mod memory;

pub use memory::MemoryStore;

use crate::domain::{
    Meter, MeterId, MeterPatch, NewMeter, NewProvider, NewUser, Provider, ProviderId,
    ProviderPatch, Reading, User, UserId, UserPatch,
};

pub trait Store {
    fn create_user(&mut self, new: NewUser) -> User;
    fn user(&self, id: UserId) -> Option<User>;
    fn users(&self) -> Vec<User>;
    fn update_user(&mut self, id: UserId, patch: &UserPatch) -> Option<User>;
    fn delete_user(&mut self, id: UserId) -> bool;
    fn set_subscription(&mut self, id: UserId, provider_id: ProviderId) -> Option<User>;

    fn create_provider(&mut self, new: NewProvider) -> Provider;
    fn provider(&self, id: ProviderId) -> Option<Provider>;
    fn providers(&self) -> Vec<Provider>;
    fn update_provider(&mut self, id: ProviderId, patch: &ProviderPatch) -> Option<Provider>;
    fn delete_provider(&mut self, id: ProviderId) -> bool;

    fn create_meter(&mut self, new: NewMeter) -> Meter;
    fn meter(&self, id: MeterId) -> Option<Meter>;
    fn update_meter(&mut self, id: MeterId, patch: &MeterPatch) -> Option<Meter>;
    /// Drops the meter together with its readings.
    fn delete_meter(&mut self, id: MeterId) -> bool;
    fn meters_for_user(&self, user_id: UserId) -> Vec<Meter>;
    /// Appends to the meter's readings; `None` if the meter does not exist.
    fn append_reading(&mut self, meter_id: MeterId, reading: Reading) -> Option<Reading>;

    fn user_exists(&self, id: UserId) -> bool {
        self.user(id).is_some()
    }

    fn provider_exists(&self, id: ProviderId) -> bool {
        self.provider(id).is_some()
    }
}
