//! cse-harvest: batch collector for Google Custom Search results
//!
//! Reads queries from a dataset column, pages through the Custom Search JSON
//! API for each one, fetches every result link and extracts its main text,
//! and writes raw results and extracted text to paired JSON Lines batch
//! files.

pub mod config;
pub mod engines;
pub mod error;
pub mod extract;
pub mod network;
pub mod output;
pub mod queries;
pub mod results;
pub mod search;

pub use config::{Credentials, RunConfig, Settings};
pub use engines::{Engine, GoogleCse};
pub use error::{ConfigError, OutputError, QuerySourceError};
pub use extract::TextExtractor;
pub use results::{ExtractedRecord, RawRecord, RunCounters, SearchOutcome};
pub use search::{BatchOrchestrator, QueryProcessor, RunSummary};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
