//! Per-query, per-batch and per-run result models

use crate::results::{RecordContainer, RunCounters};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Records and counters produced by one query
pub type QueryOutcome = RecordContainer;

/// What one batch produced and what reached each destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// 0-based batch index
    pub index: usize,
    /// Queries processed in this batch
    pub queries: usize,
    pub elapsed: Duration,
    pub counters: RunCounters,
    /// Raw records persisted
    pub raw_written: usize,
    /// Extracted records persisted
    pub extracted_written: usize,
    /// Raw records collected
    pub raw_records: usize,
    /// Extracted records collected
    pub extracted_records: usize,
}

impl BatchReport {
    /// Fraction of collected raw records that were persisted
    pub fn raw_ratio(&self) -> f64 {
        ratio(self.raw_written, self.raw_records)
    }

    /// Fraction of collected extracted records that were persisted
    pub fn extracted_ratio(&self) -> f64 {
        ratio(self.extracted_written, self.extracted_records)
    }
}

fn ratio(written: usize, collected: usize) -> f64 {
    if collected == 0 {
        1.0
    } else {
        written as f64 / collected as f64
    }
}

/// Totals for a whole run, complete or cut short
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Column the queries were read from, when known
    pub query_column: Option<String>,
    pub queries_total: usize,
    pub queries_processed: usize,
    pub batch_size: usize,
    pub counters: RunCounters,
    pub raw_written: usize,
    pub extracted_written: usize,
    pub batches: Vec<BatchReport>,
    pub raw_dir: Option<PathBuf>,
    pub extracted_dir: Option<PathBuf>,
    /// Error that ended the run early
    pub aborted: Option<String>,
}

impl RunSummary {
    pub fn new(queries_total: usize, batch_size: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            query_column: None,
            queries_total,
            queries_processed: 0,
            batch_size,
            counters: RunCounters::default(),
            raw_written: 0,
            extracted_written: 0,
            batches: Vec::new(),
            raw_dir: None,
            extracted_dir: None,
            aborted: None,
        }
    }

    /// Whether every query was processed
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none() && self.queries_processed == self.queries_total
    }

    /// Fold a finished batch into the run totals
    pub fn record_batch(&mut self, report: BatchReport) {
        self.raw_written += report.raw_written;
        self.extracted_written += report.extracted_written;
        self.batches.push(report);
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Processing Summary ---")?;
        writeln!(f, "Run: {} (started {})", self.run_id, self.started_at.to_rfc3339())?;
        if let Some(ref column) = self.query_column {
            writeln!(f, "Input Source: query column '{}'", column)?;
        }
        writeln!(
            f,
            "Processed {} out of {} total queries.",
            self.queries_processed, self.queries_total
        )?;
        writeln!(f, "Batch size: {}", self.batch_size)?;
        writeln!(f, "Total raw search results generated: {}", self.counters.raw_saved)?;
        writeln!(f, "Total URLs processed for extraction: {}", self.counters.urls_processed)?;
        writeln!(
            f,
            "Total successful text extractions: {}",
            self.counters.extractions_success
        )?;
        writeln!(
            f,
            "Total raw result lines successfully written to batch files: {}",
            self.raw_written
        )?;
        writeln!(
            f,
            "Total extracted text lines successfully written to batch files: {}",
            self.extracted_written
        )?;
        if let Some(ref dir) = self.raw_dir {
            writeln!(f, "Raw search batch files saved in: {}/", dir.display())?;
        }
        if let Some(ref dir) = self.extracted_dir {
            writeln!(f, "Extracted text batch files saved in: {}/", dir.display())?;
        }
        if let Some(ref reason) = self.aborted {
            writeln!(f, "Run ended early: {}", reason)?;
        }
        write!(f, "------------------------")
    }
}
