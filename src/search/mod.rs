//! Search orchestration module
//!
//! Runs each query through paginated search and page extraction, groups
//! queries into batches, and persists every batch before moving on.

mod batch;
mod client;
mod models;
mod observer;
mod processor;

pub use batch::{partition, BatchOrchestrator, Sleeper, TokioSleeper};
pub use client::{EngineSearchClient, SearchClient};
pub use models::*;
pub use observer::{BatchObserver, LoggingObserver, NoOpObserver};
pub use processor::{short_query, QueryProcessor};
