//! Batch record persistence

use super::layout::BatchLayout;
use crate::error::OutputError;
use crate::results::{ExtractedRecord, RawRecord};
use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, error};

/// Persists one batch's records to the raw and extracted destinations
///
/// The two writes are independent: a failure on one must not stop the
/// caller from attempting the other. Both return the number of records
/// actually written.
#[async_trait]
pub trait BatchRecordSink: Send + Sync {
    async fn write_raw(&self, batch: usize, records: &[RawRecord]) -> Result<usize, OutputError>;

    async fn write_extracted(
        &self,
        batch: usize,
        records: &[ExtractedRecord],
    ) -> Result<usize, OutputError>;
}

/// Writes each batch as a JSON Lines file under its [`BatchLayout`]
#[derive(Debug, Clone)]
pub struct JsonlFileSink {
    raw: BatchLayout,
    extracted: BatchLayout,
}

impl JsonlFileSink {
    pub fn new(raw: BatchLayout, extracted: BatchLayout) -> Self {
        Self { raw, extracted }
    }
}

/// Write `records` one JSON object per line, skipping records that fail
async fn write_jsonl<T, F>(path: &Path, records: &[T], url_of: F) -> Result<usize, OutputError>
where
    T: Serialize + Sync,
    F: Fn(&T) -> Option<&str> + Send,
{
    let file_error = |source| OutputError::File {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).await.map_err(file_error)?;
    let mut writer = BufWriter::new(file);
    let mut written = 0;

    for record in records {
        let line = match serde_json::to_string(record) {
            Ok(line) => line,
            Err(e) => {
                error!(
                    file = %path.display(),
                    url = url_of(record).unwrap_or("N/A"),
                    "Failed to serialize record: {}", e
                );
                continue;
            }
        };

        let result = async {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await
        }
        .await;

        match result {
            Ok(()) => written += 1,
            Err(e) => error!(
                file = %path.display(),
                url = url_of(record).unwrap_or("N/A"),
                "Failed to write record: {}", e
            ),
        }
    }

    writer.flush().await.map_err(file_error)?;
    debug!(file = %path.display(), written, "Batch file written");
    Ok(written)
}

#[async_trait]
impl BatchRecordSink for JsonlFileSink {
    async fn write_raw(&self, batch: usize, records: &[RawRecord]) -> Result<usize, OutputError> {
        write_jsonl(&self.raw.batch_path(batch), records, |r| r.link.as_deref()).await
    }

    async fn write_extracted(
        &self,
        batch: usize,
        records: &[ExtractedRecord],
    ) -> Result<usize, OutputError> {
        write_jsonl(&self.extracted.batch_path(batch), records, |r| r.url.as_deref()).await
    }
}
