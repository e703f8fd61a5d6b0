use std::{fs::File, path::PathBuf};

use billing_core::domain::{timestamp, Reading};
use csv::StringRecord;

use super::{ImportError, ImportedReading, ReadingSource, ReadingStream};

/// CSV source of meter readings.
///
/// Expected header columns (by name):
/// - meter_id
/// - units
/// - time (RFC3339 timestamp or YYYY-MM-DD date)
pub struct ReadingsCsvFileSource {
    path: PathBuf,
}

impl ReadingsCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

fn record_to_reading(
    record: &StringRecord,
    headers: &StringRecord,
    number: u64,
) -> Result<ImportedReading, ImportError> {
    let fail = |reason: String| ImportError::Record {
        record: number,
        reason,
    };
    let get = |name: &str| -> Result<&str, ImportError> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .ok_or_else(|| fail(format!("missing column '{name}'")))
    };

    let meter_str = get("meter_id")?;
    let meter_id = meter_str
        .parse()
        .map_err(|e| fail(format!("invalid meter_id '{meter_str}': {e}")))?;

    let units_str = get("units")?;
    let units: f64 = units_str
        .parse()
        .map_err(|e| fail(format!("invalid units '{units_str}': {e}")))?;

    let time = timestamp::parse_instant(get("time")?).map_err(|e| fail(e.to_string()))?;

    Ok(ImportedReading {
        record: number,
        meter_id,
        reading: Reading::new(units, time),
    })
}

#[async_trait::async_trait]
impl ReadingSource for ReadingsCsvFileSource {
    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }

    async fn stream(&self) -> ReadingStream {
        // Blocking CSV reader inside a single async task; seed files are small.
        let path = self.path.clone();
        let s = async_stream::stream! {
            let file = match File::open(&path) {
                Ok(f) => f,
                Err(e) => {
                    yield Err(ImportError::Source(format!("failed to open CSV file: {e}")));
                    return;
                }
            };
            let mut rdr = csv::Reader::from_reader(file);
            let headers = match rdr.headers() {
                Ok(h) => h.clone(),
                Err(e) => {
                    yield Err(ImportError::Source(format!("failed to read CSV headers: {e}")));
                    return;
                }
            };

            for (idx, result) in rdr.records().enumerate() {
                let number = idx as u64 + 1;
                let item = match result {
                    Ok(record) => record_to_reading(&record, &headers, number),
                    Err(e) => Err(ImportError::Record {
                        record: number,
                        reason: format!("failed to read CSV record: {e}"),
                    }),
                };
                yield item;
            }
        };

        Box::pin(s)
    }
}
