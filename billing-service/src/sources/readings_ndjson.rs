use std::path::PathBuf;

use async_stream::stream;
use billing_core::domain::{timestamp, MeterId, Reading};
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};

use super::{ImportError, ImportedReading, ReadingSource, ReadingStream};

/// NDJSON source of meter readings.
///
/// Each non-empty line is an object such as
/// `{"meterId": 1, "units": 12.5, "time": "2024-01-15T10:00:00Z"}`.
pub struct ReadingsNdjsonFileSource {
    path: PathBuf,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadingLine {
    meter_id: MeterId,
    units: f64,
    time: String,
}

impl ReadingsNdjsonFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

fn parse_line(line: &str, number: u64) -> Result<ImportedReading, ImportError> {
    let fail = |reason: String| ImportError::Record {
        record: number,
        reason,
    };
    let parsed: ReadingLine =
        serde_json::from_str(line).map_err(|e| fail(format!("invalid json: {e}")))?;
    let time = timestamp::parse_instant(&parsed.time).map_err(|e| fail(e.to_string()))?;
    Ok(ImportedReading {
        record: number,
        meter_id: parsed.meter_id,
        reading: Reading::new(parsed.units, time),
    })
}

#[async_trait::async_trait]
impl ReadingSource for ReadingsNdjsonFileSource {
    fn describe(&self) -> String {
        format!("ndjson:{}", self.path.display())
    }

    async fn stream(&self) -> ReadingStream {
        let path = self.path.clone();
        let s = stream! {
            let file = match File::open(&path).await {
                Ok(f) => f,
                Err(e) => {
                    yield Err(ImportError::Source(format!("failed to open NDJSON file: {e}")));
                    return;
                }
            };
            let mut lines = BufReader::new(file).lines();
            let mut number = 0u64;

            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(ImportError::Source(format!("failed to read NDJSON line: {e}")));
                        return;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                number += 1;
                yield parse_line(&line, number);
            }
        };

        Box::pin(s)
    }
}
