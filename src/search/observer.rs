//! Run progress observers

use super::models::{BatchReport, RunSummary};
use tracing::info;

/// Receives progress as the orchestrator works through batches
pub trait BatchObserver: Send + Sync {
    fn on_run_start(&self, total_queries: usize, total_batches: usize);

    fn on_batch_complete(&self, report: &BatchReport);

    fn on_run_end(&self, summary: &RunSummary);
}

/// Ignores every event
pub struct NoOpObserver;

impl BatchObserver for NoOpObserver {
    fn on_run_start(&self, _total_queries: usize, _total_batches: usize) {}

    fn on_batch_complete(&self, _report: &BatchReport) {}

    fn on_run_end(&self, _summary: &RunSummary) {}
}

/// Logs each event through `tracing`
pub struct LoggingObserver;

impl BatchObserver for LoggingObserver {
    fn on_run_start(&self, total_queries: usize, total_batches: usize) {
        info!(
            "Processing {} queries in {} batches",
            total_queries, total_batches
        );
    }

    fn on_batch_complete(&self, report: &BatchReport) {
        info!(
            batch = report.index + 1,
            raw_saved = %format!("{:.2}", report.raw_ratio()),
            extracted_saved = %format!("{:.2}", report.extracted_ratio()),
            "Batch completed {} queries in {:.2}s",
            report.queries,
            report.elapsed.as_secs_f64()
        );
    }

    fn on_run_end(&self, summary: &RunSummary) {
        info!(
            run_id = %summary.run_id,
            processed = summary.queries_processed,
            total = summary.queries_total,
            "Run finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::RunCounters;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_observers_accept_every_event() {
        let report = BatchReport {
            index: 0,
            queries: 1,
            elapsed: Duration::from_millis(3),
            counters: RunCounters::default(),
            raw_written: 0,
            extracted_written: 0,
            raw_records: 0,
            extracted_records: 0,
        };
        let summary = RunSummary::new(1, 1);

        let observers: Vec<Arc<dyn BatchObserver>> = vec![Arc::new(NoOpObserver), Arc::new(LoggingObserver)];
        for observer in observers {
            observer.on_run_start(1, 1);
            observer.on_batch_complete(&report);
            observer.on_run_end(&summary);
        }
    }
}
