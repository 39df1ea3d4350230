//! cse-harvest: collect search results and page text for a query dataset
//!
//! This is the main entry point for the application.

use anyhow::Result;
use clap::Parser;
use cse_harvest::{
    config::{self, Credentials, RunConfig},
    engines::GoogleCse,
    extract::build_extractor,
    network::HttpClient,
    output::{BatchLayout, JsonlFileSink},
    queries::{FileQuerySource, QuerySource},
    search::{
        BatchObserver, BatchOrchestrator, BatchReport, EngineSearchClient, QueryProcessor,
        RunSummary,
    },
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Search a query column with Google Custom Search and extract page text
#[derive(Parser, Debug)]
#[command(name = "cse-harvest", version, about)]
struct Cli {
    /// Dataset column holding the queries
    #[arg(long, env = "CSE_HARVEST_QUERY_COLUMN")]
    query_column: String,

    /// Maximum search result pages per query
    #[arg(short, long, default_value_t = 1)]
    pages: i64,

    /// Results per page (1-10)
    #[arg(short = 'n', long)]
    num_results: Option<i64>,

    /// Seconds to wait between queries
    #[arg(short, long)]
    delay: Option<f64>,

    /// Seconds allowed for each page fetch
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Restrict results to one site or domain
    #[arg(long)]
    site_search: Option<String>,

    /// Queries per batch file
    #[arg(long, default_value_t = 10)]
    batch_size: i64,

    /// Base path for raw search batches
    #[arg(long)]
    search_output_base: Option<PathBuf>,

    /// Base path for extracted text batches
    #[arg(long)]
    extracted_output_base: Option<PathBuf>,

    /// Query dataset (.jsonl or .json)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

/// Progress bar advanced once per finished batch
struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl BatchObserver for ProgressObserver {
    fn on_run_start(&self, _total_queries: usize, total_batches: usize) {
        self.bar.set_length(total_batches as u64);
        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} batches ({eta})")
        {
            self.bar.set_style(style.progress_chars("##-"));
        }
        self.bar.set_message("Processing Batches");
    }

    fn on_batch_complete(&self, report: &BatchReport) {
        self.bar.inc(1);
        info!(
            batch = report.index + 1,
            raw_saved = %format!("{:.2}", report.raw_ratio()),
            extracted_saved = %format!("{:.2}", report.extracted_ratio()),
            "Finished saving batch"
        );
    }

    fn on_run_end(&self, summary: &RunSummary) {
        if summary.aborted.is_some() {
            self.bar.abandon_with_message("Processing stopped early");
        } else {
            self.bar.finish_with_message("Processing complete");
        }
    }
}

fn init_logging(default_level: &str, debug: bool) {
    let default_level = if debug { "debug" } else { default_level };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Settings decide the default log level, so load them before logging is up
    let settings = config::load_settings(cli.settings.as_deref());
    let log_level = settings
        .as_ref()
        .map(|s| s.general.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(&log_level, cli.debug);

    info!("Starting cse-harvest v{}", cse_harvest::VERSION);

    let settings = settings.map_err(|e| {
        error!("{}", e);
        e
    })?;

    let credentials = Credentials::from_env().map_err(|e| {
        error!("{}", e);
        e
    })?;

    let run_config = RunConfig::from_raw(
        cli.pages,
        cli.num_results.unwrap_or(settings.search.results_per_page),
        cli.delay.unwrap_or(settings.search.request_delay),
        cli.timeout.unwrap_or(settings.outgoing.request_timeout),
        cli.site_search.clone(),
        cli.batch_size,
    );
    info!(?run_config, "Run configuration");

    let input = cli.input.clone().unwrap_or_else(|| settings.input.path.clone());
    let queries = FileQuerySource::new(input)
        .load(&cli.query_column)
        .await
        .map_err(|e| {
            error!("Failed to load queries: {}", e);
            e
        })?;

    if queries.is_empty() {
        println!("No queries to process.");
        return Ok(());
    }

    let raw_base = cli
        .search_output_base
        .clone()
        .unwrap_or_else(|| settings.output.search_base.clone());
    let extracted_base = cli
        .extracted_output_base
        .clone()
        .unwrap_or_else(|| settings.output.extracted_base.clone());

    let raw_layout = BatchLayout::from_base(&raw_base).map_err(|e| {
        error!("Failed to create output directories: {}. Exiting.", e);
        e
    })?;
    let extracted_layout = BatchLayout::from_base(&extracted_base).map_err(|e| {
        error!("Failed to create output directories: {}. Exiting.", e);
        e
    })?;

    let client = HttpClient::with_settings(&settings.outgoing)?;
    let engine = GoogleCse::new(credentials)
        .with_api_url(settings.search.api_url.clone())
        .with_timeout(settings.search.api_timeout);
    let search = Arc::new(EngineSearchClient::new(client.clone(), Arc::new(engine)));
    let extractor = build_extractor(client, &settings.rendering);

    let orchestrator = BatchOrchestrator::new(
        QueryProcessor::new(search, extractor),
        Arc::new(JsonlFileSink::new(
            raw_layout.clone(),
            extracted_layout.clone(),
        )),
    )
    .with_observer(Arc::new(ProgressObserver::new()))
    .with_query_column(cli.query_column.clone())
    .with_output_dirs(
        raw_layout.dir().to_path_buf(),
        extracted_layout.dir().to_path_buf(),
    );

    let summary = orchestrator.run(&queries, &run_config).await;

    println!("\n{}\n", summary);

    Ok(())
}
