//! Billing engine for metered utility consumption.
//!
//! Users subscribe to one provider at a time; a bill is the sum of the
//! readings on a user's meters multiplied by that provider's per-unit charge.

pub mod auth;
pub mod billing;
pub mod consumption;
pub mod domain;
pub mod entities;
pub mod error;
pub mod query;
pub mod store;
pub mod subscription;
pub mod validate;

pub use billing::{bill, Bill};
pub use error::{BillingError, EntityKind};
pub use query::{DateRange, PageRequest, ReadingFilter};
pub use store::{MemoryStore, Store};
