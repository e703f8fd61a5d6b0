pub mod api;
pub mod config;
pub mod metrics_server;
pub mod observability;
pub mod seed;
pub mod sources;

use std::sync::Arc;

use billing_core::Store;
use tokio::sync::Mutex;

/// The entity store shared by all request handlers. Handlers hold the lock
/// for their whole body, so each operation sees and leaves a consistent store.
pub type SharedStore = Arc<Mutex<dyn Store + Send>>;

pub use api::{router, AppState};
