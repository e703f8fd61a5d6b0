use std::{env, path::Path};

use anyhow::{bail, Result};
use billing_core::validate;
use billing_service::{
    observability,
    sources::{ImportError, ReadingSource, ReadingsCsvFileSource, ReadingsNdjsonFileSource},
};
use futures::StreamExt;

/// Dry run of a readings file: parses and validates every record without
/// touching a store, then reports how many would be imported.
#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: check_readings <readings.csv|readings.ndjson>");
    }
    let path = Path::new(&args[1]);

    let source: Box<dyn ReadingSource> = match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => Box::new(ReadingsCsvFileSource::new(path)),
        Some("ndjson") | Some("jsonl") => Box::new(ReadingsNdjsonFileSource::new(path)),
        _ => bail!("unsupported file type for {}", path.display()),
    };

    let mut stream = source.stream().await;
    let (mut valid, mut invalid) = (0u64, 0u64);
    while let Some(item) = stream.next().await {
        match item {
            Ok(imported) => match validate::reading(&imported.reading) {
                Ok(()) => valid += 1,
                Err(e) => {
                    invalid += 1;
                    tracing::warn!(record = imported.record, error = %e, "invalid reading");
                }
            },
            Err(ImportError::Record { record, reason }) => {
                invalid += 1;
                tracing::warn!(record, %reason, "unreadable record");
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(source = %source.describe(), valid, invalid, "readings checked");
    if invalid > 0 {
        bail!("{invalid} of {} records would be rejected", valid + invalid);
    }
    Ok(())
}
