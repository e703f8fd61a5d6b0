use std::sync::Arc;

use anyhow::Context;
use billing_core::{entities, subscription, MemoryStore};
use tokio::sync::Mutex;

use crate::{
    config::SeedConfig,
    sources::{self, ReadingsCsvFileSource, ReadingsNdjsonFileSource},
    SharedStore,
};

/// Builds the store the service starts with: configured providers, users and
/// meters in that order, then any reading files.
pub async fn build_store(seed: &SeedConfig) -> anyhow::Result<SharedStore> {
    let mut store = MemoryStore::new();

    for provider in &seed.providers {
        entities::create_provider(&mut store, provider.into())
            .with_context(|| format!("invalid seed provider '{}'", provider.name))?;
    }
    for user in &seed.users {
        let created = entities::register_user(&mut store, user.into())
            .with_context(|| format!("invalid seed user '{}'", user.username))?;
        if let Some(provider_id) = user.provider_id {
            subscription::subscribe(&mut store, created.id, provider_id)
                .with_context(|| format!("cannot subscribe seed user '{}'", user.username))?;
        }
    }
    for meter in &seed.meters {
        entities::install_meter(&mut store, meter.into())
            .with_context(|| format!("invalid seed meter '{}'", meter.name))?;
    }

    tracing::info!(
        providers = seed.providers.len(),
        users = seed.users.len(),
        meters = seed.meters.len(),
        "store seeded"
    );

    let shared: SharedStore = Arc::new(Mutex::new(store));

    if let Some(path) = &seed.readings_csv {
        sources::import_readings(&ReadingsCsvFileSource::new(path), &shared).await?;
    }
    if let Some(path) = &seed.readings_ndjson {
        sources::import_readings(&ReadingsNdjsonFileSource::new(path), &shared).await?;
    }

    Ok(shared)
}
