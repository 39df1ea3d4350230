//! Record and outcome type definitions

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Placeholder for absent provider fields
pub const MISSING_FIELD: &str = "N/A";

/// A normalized search hit with a valid http(s) link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub title: String,
    pub link: Option<String>,
    pub snippet: String,
}

impl SearchResultItem {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: Some(link.into()),
            snippet: snippet.into(),
        }
    }
}

/// Whether a link is an absolute http(s) URL
pub fn is_valid_link(link: &str) -> bool {
    link.starts_with("http://") || link.starts_with("https://")
}

/// A search hit annotated with the query and its position
///
/// Serialized field order matches the batch file layout:
/// `title, link, snippet, query, search_page, approx_rank`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub title: String,
    pub link: Option<String>,
    pub snippet: String,
    pub query: String,
    /// 1-based search page
    pub search_page: u32,
    /// 1-based rank across pages, assuming a stable page size
    pub approx_rank: u32,
}

impl RawRecord {
    pub fn from_item(item: &SearchResultItem, query: &str, search_page: u32, approx_rank: u32) -> Self {
        Self {
            title: item.title.clone(),
            link: item.link.clone(),
            snippet: item.snippet.clone(),
            query: query.to_string(),
            search_page,
            approx_rank,
        }
    }
}

/// Extracted page text paired one-to-one with a [`RawRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub query: String,
    pub search_page: u32,
    pub approx_rank: u32,
    pub url: Option<String>,
    pub title: String,
    /// `None` when there was no link or extraction produced nothing
    pub extracted_text: Option<String>,
}

impl ExtractedRecord {
    pub fn for_raw(raw: &RawRecord, extracted_text: Option<String>) -> Self {
        Self {
            query: raw.query.clone(),
            search_page: raw.search_page,
            approx_rank: raw.approx_rank,
            url: raw.link.clone(),
            title: raw.title.clone(),
            extracted_text,
        }
    }
}

/// Record counters, accumulated per query, per batch and per run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    pub raw_saved: u64,
    pub urls_processed: u64,
    pub extractions_success: u64,
}

impl AddAssign for RunCounters {
    fn add_assign(&mut self, other: Self) {
        self.raw_saved += other.raw_saved;
        self.urls_processed += other.urls_processed;
        self.extractions_success += other.extractions_success;
    }
}

/// Classified search failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchFailure {
    Timeout,
    NetworkError(String),
    HttpError(u16),
    Malformed(String),
    Provider { code: Option<i64>, message: String },
}

impl SearchFailure {
    /// Transport-level failures, as opposed to a response the provider sent back
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Timeout | Self::NetworkError(_) | Self::HttpError(_))
    }
}

impl std::fmt::Display for SearchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "Request timed out"),
            Self::NetworkError(msg) => write!(f, "Network error: {}", msg),
            Self::HttpError(code) => write!(f, "HTTP error: {}", code),
            Self::Malformed(msg) => write!(f, "Malformed response: {}", msg),
            Self::Provider { code, message } => match code {
                Some(code) => write!(f, "Provider error: Code {} - {}", code, message),
                None => write!(f, "Provider error: {}", message),
            },
        }
    }
}

/// Result of one search page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Items that survived normalization, in provider order
    Success(Vec<SearchResultItem>),
    Failure(SearchFailure),
}
