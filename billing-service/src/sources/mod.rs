//! Bulk loading of meter readings from files.
//!
//! A [`ReadingSource`] yields one item per record. Record-level problems are
//! reported as [`ImportError::Record`] and skipped by [`import_readings`];
//! anything else aborts the import.

use std::pin::Pin;

use billing_core::{
    domain::{MeterId, Reading},
    entities,
};
use futures::{Stream, StreamExt};

use crate::SharedStore;

pub mod readings_csv;
pub mod readings_ndjson;

pub use readings_csv::ReadingsCsvFileSource;
pub use readings_ndjson::ReadingsNdjsonFileSource;

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedReading {
    /// 1-based record number within the source, for diagnostics.
    pub record: u64,
    pub meter_id: MeterId,
    pub reading: Reading,
}

#[derive(thiserror::Error, Debug)]
pub enum ImportError {
    #[error("source error: {0}")]
    Source(String),
    #[error("record {record}: {reason}")]
    Record { record: u64, reason: String },
}

pub type ReadingStream = Pin<Box<dyn Stream<Item = Result<ImportedReading, ImportError>> + Send>>;

#[async_trait::async_trait]
pub trait ReadingSource: Send + Sync {
    fn describe(&self) -> String;

    async fn stream(&self) -> ReadingStream;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: u64,
    pub rejected: u64,
}

/// Appends every acceptable reading from `source` to the store.
///
/// The store lock is taken per record, so the API stays responsive while a
/// large file is loading.
pub async fn import_readings<R>(source: &R, store: &SharedStore) -> Result<ImportSummary, ImportError>
where
    R: ReadingSource + ?Sized,
{
    let mut stream = source.stream().await;
    let mut summary = ImportSummary::default();

    while let Some(item) = stream.next().await {
        let imported = match item {
            Ok(imported) => imported,
            Err(ImportError::Record { record, reason }) => {
                tracing::warn!(source = %source.describe(), record, %reason, "skipping unreadable record");
                metrics::counter!("reading_import_rejected_total").increment(1);
                summary.rejected += 1;
                continue;
            }
            Err(e) => {
                tracing::error!(source = %source.describe(), error = %e, "reading import aborted");
                return Err(e);
            }
        };

        let mut guard = store.lock().await;
        match entities::record_reading(&mut *guard, imported.meter_id, imported.reading) {
            Ok(_) => {
                summary.imported += 1;
                metrics::counter!("reading_import_records_total").increment(1);
            }
            Err(e) => {
                tracing::warn!(
                    source = %source.describe(),
                    record = imported.record,
                    meter_id = imported.meter_id,
                    error = %e,
                    "skipping rejected reading"
                );
                metrics::counter!("reading_import_rejected_total").increment(1);
                summary.rejected += 1;
            }
        }
    }

    tracing::info!(
        source = %source.describe(),
        imported = summary.imported,
        rejected = summary.rejected,
        "reading import finished"
    );
    Ok(summary)
}
