//! Batch orchestration
//!
//! Queries are split into fixed-size batches and run strictly in order. Each
//! batch is flushed to both destinations before the next one starts, so an
//! interrupted run leaves every completed batch on disk.

use super::models::{BatchReport, RunSummary};
use super::observer::{BatchObserver, NoOpObserver};
use super::processor::{short_query, QueryProcessor};
use crate::config::RunConfig;
use crate::output::BatchRecordSink;
use crate::results::RecordContainer;
use anyhow::Context;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Pause between queries
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Consecutive batches of at most `batch_size` queries
pub fn partition(queries: &[String], batch_size: usize) -> Vec<&[String]> {
    queries.chunks(batch_size.max(1)).collect()
}

/// Drives queries through the processor batch by batch
pub struct BatchOrchestrator {
    processor: QueryProcessor,
    sink: Arc<dyn BatchRecordSink>,
    sleeper: Arc<dyn Sleeper>,
    observer: Arc<dyn BatchObserver>,
    query_column: Option<String>,
    output_dirs: Option<(PathBuf, PathBuf)>,
}

impl BatchOrchestrator {
    pub fn new(processor: QueryProcessor, sink: Arc<dyn BatchRecordSink>) -> Self {
        Self {
            processor,
            sink,
            sleeper: Arc::new(TokioSleeper),
            observer: Arc::new(NoOpObserver),
            query_column: None,
            output_dirs: None,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn BatchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Column name reported in the summary
    pub fn with_query_column(mut self, column: impl Into<String>) -> Self {
        self.query_column = Some(column.into());
        self
    }

    /// Batch directories reported in the summary
    pub fn with_output_dirs(mut self, raw: PathBuf, extracted: PathBuf) -> Self {
        self.output_dirs = Some((raw, extracted));
        self
    }

    /// Process every query and report what was done
    ///
    /// Never fails: an unexpected error ends the run early and is recorded
    /// in [`RunSummary::aborted`], with everything before it accounted for.
    pub async fn run(&self, queries: &[String], config: &RunConfig) -> RunSummary {
        let batch_size = config.batch_size.max(1);
        let batches = partition(queries, batch_size);

        let mut summary = RunSummary::new(queries.len(), batch_size);
        summary.query_column = self.query_column.clone();
        if let Some((ref raw, ref extracted)) = self.output_dirs {
            summary.raw_dir = Some(raw.clone());
            summary.extracted_dir = Some(extracted.clone());
        }

        info!(
            run_id = %summary.run_id,
            "Processing {} queries in {} batches of size {}",
            queries.len(),
            batches.len(),
            batch_size
        );
        self.observer.on_run_start(queries.len(), batches.len());

        if let Err(e) = self.run_batches(&batches, config, &mut summary).await {
            error!(
                processed = summary.queries_processed,
                "An unexpected error ended the run early: {:#}", e
            );
            summary.aborted = Some(format!("{:#}", e));
        }

        self.observer.on_run_end(&summary);
        summary
    }

    async fn run_batches(
        &self,
        batches: &[&[String]],
        config: &RunConfig,
        summary: &mut RunSummary,
    ) -> anyhow::Result<()> {
        let total = batches.len();
        // Delay applies between queries across the whole run, never before the first
        let mut any_query_run = false;

        for (index, batch) in batches.iter().enumerate() {
            let started = Instant::now();
            let mut records = RecordContainer::new();
            debug!(batch = index + 1, "Starting batch {}/{}", index + 1, total);

            for query in batch.iter() {
                if any_query_run && !config.delay.is_zero() {
                    debug!(
                        batch = index + 1,
                        "Waiting {:.2} seconds before next query",
                        config.delay.as_secs_f64()
                    );
                    self.sleeper.sleep(config.delay).await;
                }
                any_query_run = true;

                let outcome = self
                    .processor
                    .process(query, config)
                    .await
                    .with_context(|| {
                        format!("batch {} query '{}'", index + 1, short_query(query))
                    })?;

                summary.counters += outcome.counters();
                summary.queries_processed += 1;
                records.extend(outcome);
            }

            info!(
                batch = index + 1,
                "Batch completed processing {} queries in {:.2} seconds",
                batch.len(),
                started.elapsed().as_secs_f64()
            );

            let report = self.flush(index, batch.len(), records, started).await;
            self.observer.on_batch_complete(&report);
            summary.record_batch(report);
        }

        Ok(())
    }

    /// Write both destinations; a failure on one never blocks the other
    async fn flush(
        &self,
        index: usize,
        queries: usize,
        records: RecordContainer,
        started: Instant,
    ) -> BatchReport {
        let (raw, extracted, counters) = records.into_parts();

        let raw_written = match self.sink.write_raw(index, &raw).await {
            Ok(written) => written,
            Err(e) => {
                error!(batch = index + 1, "Raw batch not saved: {}", e);
                0
            }
        };

        let extracted_written = match self.sink.write_extracted(index, &extracted).await {
            Ok(written) => written,
            Err(e) => {
                error!(batch = index + 1, "Extracted batch not saved: {}", e);
                0
            }
        };

        BatchReport {
            index,
            queries,
            elapsed: started.elapsed(),
            counters,
            raw_written,
            extracted_written,
            raw_records: raw.len(),
            extracted_records: extracted.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::processor::tests::{page, FakeExtractor, ScriptedSearch};
    use super::*;
    use crate::error::OutputError;
    use crate::output::{BatchLayout, JsonlFileSink};
    use crate::results::{ExtractedRecord, RawRecord, SearchOutcome};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingSleeper {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Sleeper for CountingSleeper {
        async fn sleep(&self, _duration: Duration) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Keeps written batches in memory; the raw side can be made to fail
    #[derive(Default)]
    struct MemorySink {
        fail_raw: bool,
        raw: Mutex<Vec<(usize, usize)>>,
        extracted: Mutex<Vec<(usize, usize)>>,
    }

    #[async_trait]
    impl BatchRecordSink for MemorySink {
        async fn write_raw(&self, batch: usize, records: &[RawRecord]) -> Result<usize, OutputError> {
            if self.fail_raw {
                return Err(OutputError::File {
                    path: PathBuf::from("raw.jsonl"),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                });
            }
            self.raw.lock().unwrap().push((batch, records.len()));
            Ok(records.len())
        }

        async fn write_extracted(
            &self,
            batch: usize,
            records: &[ExtractedRecord],
        ) -> Result<usize, OutputError> {
            self.extracted.lock().unwrap().push((batch, records.len()));
            Ok(records.len())
        }
    }

    /// Records batch sizes seen by the observer
    #[derive(Default)]
    struct RecordingObserver {
        started: Mutex<Option<(usize, usize)>>,
        batches: Mutex<Vec<usize>>,
        ended: AtomicUsize,
    }

    impl BatchObserver for RecordingObserver {
        fn on_run_start(&self, total_queries: usize, total_batches: usize) {
            *self.started.lock().unwrap() = Some((total_queries, total_batches));
        }

        fn on_batch_complete(&self, report: &BatchReport) {
            self.batches.lock().unwrap().push(report.queries);
        }

        fn on_run_end(&self, _summary: &RunSummary) {
            self.ended.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn queries(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("query {}", i)).collect()
    }

    fn config(batch_size: usize, delay: Duration) -> RunConfig {
        RunConfig {
            max_pages: 1,
            page_size: 10,
            delay,
            batch_size,
            ..RunConfig::default()
        }
    }

    fn orchestrator(search: ScriptedSearch, sink: Arc<dyn BatchRecordSink>) -> BatchOrchestrator {
        let processor = QueryProcessor::new(Arc::new(search), Arc::new(FakeExtractor::new()));
        BatchOrchestrator::new(processor, sink)
    }

    #[test]
    fn test_partition() {
        let sizes: Vec<usize> = partition(&queries(23), 10).iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![10, 10, 3]);
        assert!(partition(&[], 10).is_empty());
        assert_eq!(partition(&queries(3), 0).len(), 3);
    }

    #[tokio::test]
    async fn test_batches_and_delays() {
        let sink = Arc::new(MemorySink::default());
        let sleeper = Arc::new(CountingSleeper::default());
        let observer = Arc::new(RecordingObserver::default());

        let summary = orchestrator(ScriptedSearch::full_pages(2, 23), sink.clone())
            .with_sleeper(sleeper.clone())
            .with_observer(observer.clone())
            .run(&queries(23), &config(10, Duration::from_millis(5)))
            .await;

        assert_eq!(sleeper.calls.load(Ordering::SeqCst), 22);
        assert_eq!(*observer.batches.lock().unwrap(), vec![10, 10, 3]);
        assert_eq!(*observer.started.lock().unwrap(), Some((23, 3)));
        assert_eq!(observer.ended.load(Ordering::SeqCst), 1);

        assert_eq!(
            *sink.raw.lock().unwrap(),
            vec![(0, 20), (1, 20), (2, 6)]
        );
        assert_eq!(summary.queries_processed, 23);
        assert_eq!(summary.counters.raw_saved, 46);
        assert_eq!(summary.raw_written, 46);
        assert_eq!(summary.extracted_written, 46);
        assert!(summary.is_complete());
    }

    #[tokio::test]
    async fn test_zero_delay_never_sleeps() {
        let sleeper = Arc::new(CountingSleeper::default());
        orchestrator(ScriptedSearch::full_pages(1, 4), Arc::new(MemorySink::default()))
            .with_sleeper(sleeper.clone())
            .run(&queries(4), &config(2, Duration::ZERO))
            .await;
        assert_eq!(sleeper.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_raw_failure_does_not_block_extracted() {
        let sink = Arc::new(MemorySink {
            fail_raw: true,
            ..MemorySink::default()
        });

        let summary = orchestrator(ScriptedSearch::full_pages(3, 2), sink.clone())
            .with_sleeper(Arc::new(CountingSleeper::default()))
            .run(&queries(2), &config(1, Duration::ZERO))
            .await;

        assert_eq!(*sink.extracted.lock().unwrap(), vec![(0, 3), (1, 3)]);
        assert_eq!(summary.raw_written, 0);
        assert_eq!(summary.extracted_written, 6);
        assert_eq!(summary.counters.raw_saved, 6);
        assert!(summary.aborted.is_none());
    }

    #[tokio::test]
    async fn test_unexpected_error_ends_run_early() {
        let search = ScriptedSearch::new(vec![
            Ok(page(1)),
            Ok(page(1)),
            Err(anyhow::anyhow!("endpoint unusable")),
            Ok(page(1)),
        ]);
        let sink = Arc::new(MemorySink::default());

        let summary = orchestrator(search, sink.clone())
            .with_sleeper(Arc::new(CountingSleeper::default()))
            .run(&queries(4), &config(2, Duration::ZERO))
            .await;

        // first batch flushed, the interrupted one is not
        assert_eq!(*sink.raw.lock().unwrap(), vec![(0, 2)]);
        assert_eq!(summary.queries_processed, 2);
        assert_eq!(summary.batches.len(), 1);
        let reason = summary.aborted.as_deref().unwrap();
        assert!(reason.contains("endpoint unusable"));
        assert!(reason.contains("batch 2"));
        assert!(!summary.is_complete());
    }

    #[tokio::test]
    async fn test_empty_results_still_write_batch_files() {
        let tmp = tempfile::tempdir().unwrap();
        let raw = BatchLayout::from_base(tmp.path().join("raw_search")).unwrap();
        let text = BatchLayout::from_base(tmp.path().join("extracted_text")).unwrap();
        let sink = Arc::new(JsonlFileSink::new(raw.clone(), text.clone()));

        let search = ScriptedSearch::new(vec![Ok(SearchOutcome::Success(vec![]))]);
        let summary = orchestrator(search, sink)
            .with_output_dirs(raw.dir().to_path_buf(), text.dir().to_path_buf())
            .with_query_column("Statement")
            .run(&queries(1), &config(10, Duration::ZERO))
            .await;

        assert!(raw.batch_path(0).is_file());
        assert!(text.batch_path(0).is_file());
        assert_eq!(summary.raw_written, 0);
        assert_eq!(summary.raw_dir.as_deref(), Some(raw.dir()));
        assert!(summary.to_string().contains("'Statement'"));
    }

    #[tokio::test]
    async fn test_end_to_end_files_match() {
        let tmp = tempfile::tempdir().unwrap();
        let raw = BatchLayout::from_base(tmp.path().join("raw")).unwrap();
        let text = BatchLayout::from_base(tmp.path().join("text")).unwrap();
        let sink = Arc::new(JsonlFileSink::new(raw.clone(), text.clone()));

        let summary = orchestrator(ScriptedSearch::full_pages(4, 3), sink)
            .with_sleeper(Arc::new(CountingSleeper::default()))
            .run(&queries(3), &config(2, Duration::from_secs(1)))
            .await;

        let count_lines = |path: PathBuf| std::fs::read_to_string(path).unwrap().lines().count();
        assert_eq!(count_lines(raw.batch_path(0)), 8);
        assert_eq!(count_lines(text.batch_path(0)), 8);
        assert_eq!(count_lines(raw.batch_path(1)), 4);
        assert_eq!(summary.counters.extractions_success, 12);
        tokio_test::assert_ok!(std::fs::metadata(text.batch_path(1)));
    }
}
