pub mod meter;
pub mod provider;
pub mod timestamp;
pub mod user;

pub use meter::{Meter, MeterId, MeterPatch, NewMeter, Reading};
pub use provider::{NewProvider, Provider, ProviderId, ProviderPatch};
pub use user::{NewUser, User, UserId, UserPatch};

/// Returns the value of a partial-update field when it carries something
/// worth writing. Blank strings count as "not provided".
pub(crate) fn supplied(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.trim().is_empty())
}
