//! Per-query pagination, extraction and record building

use super::client::SearchClient;
use super::models::QueryOutcome;
use crate::config::RunConfig;
use crate::engines::PageRequest;
use crate::extract::TextExtractor;
use crate::results::{
    is_valid_link, ExtractedRecord, RawRecord, RecordContainer, SearchOutcome, SearchResultItem,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Longest query prefix shown in log lines
const LOG_QUERY_CHARS: usize = 35;

/// Query shortened for log output
pub fn short_query(query: &str) -> String {
    if query.chars().count() > LOG_QUERY_CHARS {
        let prefix: String = query.chars().take(LOG_QUERY_CHARS).collect();
        format!("{}...", prefix)
    } else {
        query.to_string()
    }
}

/// Drop items whose link is present but not http(s)
fn normalize_items(items: Vec<SearchResultItem>) -> Vec<SearchResultItem> {
    items
        .into_iter()
        .filter(|item| match item.link.as_deref() {
            Some(link) if !is_valid_link(link) => {
                warn!("Skipping result with invalid/missing link: Title '{}'", item.title);
                false
            }
            _ => true,
        })
        .collect()
}

/// Runs one query through search pagination and page extraction
pub struct QueryProcessor {
    search: Arc<dyn SearchClient>,
    extractor: Arc<dyn TextExtractor>,
}

impl QueryProcessor {
    pub fn new(search: Arc<dyn SearchClient>, extractor: Arc<dyn TextExtractor>) -> Self {
        Self { search, extractor }
    }

    /// Collect raw and extracted records for `query`
    ///
    /// Search failures end pagination and keep what earlier pages produced.
    /// Only errors the search client could not classify are returned.
    pub async fn process(&self, query: &str, config: &RunConfig) -> anyhow::Result<QueryOutcome> {
        let short = short_query(query);
        let mut outcome = RecordContainer::new();

        info!(query = %short, "Processing query");

        for page in 0..config.max_pages {
            let params = PageRequest::for_page(query, page, config.page_size)
                .with_site(config.site_search.clone());

            debug!(
                query = %short,
                page = page + 1,
                start = params.start_index,
                "Requesting search page"
            );

            let items = match self.search.search(&params).await? {
                SearchOutcome::Success(items) => normalize_items(items),
                SearchOutcome::Failure(failure) => {
                    if failure.is_network() {
                        warn!(
                            query = %short,
                            page = page + 1,
                            "Search request failed, stopping pagination: {}", failure
                        );
                    } else {
                        error!(
                            query = %short,
                            page = page + 1,
                            "Search returned an error, stopping pagination: {}", failure
                        );
                    }
                    break;
                }
            };

            if items.is_empty() {
                info!(query = %short, page = page + 1, "No more valid results found");
                break;
            }

            let page_len = items.len();
            for (position, item) in items.iter().enumerate() {
                let rank = params.start_index + position as u32;
                let raw = RawRecord::from_item(item, query, page + 1, rank);

                let text = match raw.link.as_deref() {
                    Some(link) => {
                        let text = self.extractor.extract(link, config.extraction_timeout).await;
                        outcome.record_extraction(text.is_some());
                        text
                    }
                    None => None,
                };

                let extracted = ExtractedRecord::for_raw(&raw, text);
                outcome.push(raw, extracted);
            }

            if page_len < config.page_size as usize {
                debug!(
                    query = %short,
                    page = page + 1,
                    "Fewer results than requested, assuming last page"
                );
                break;
            }
        }

        let counters = outcome.counters();
        info!(
            query = %short,
            raw = counters.raw_saved,
            urls = counters.urls_processed,
            extracted = counters.extractions_success,
            "Finished query"
        );

        Ok(outcome)
    }
}
