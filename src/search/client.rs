//! Search client: one paginated provider call per invocation

use crate::config::clamp_secs;
use crate::engines::{classify_transport_error, Engine, PageRequest};
use crate::network::HttpClient;
use crate::results::SearchOutcome;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

/// Fetches one page of search results
///
/// Classified failures come back as [`SearchOutcome::Failure`]. An `Err`
/// means something the client could not classify and is left to the caller.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, request: &PageRequest) -> anyhow::Result<SearchOutcome>;
}

/// [`SearchClient`] backed by an [`Engine`] and the shared [`HttpClient`]
pub struct EngineSearchClient {
    client: HttpClient,
    engine: Arc<dyn Engine>,
}

impl EngineSearchClient {
    pub fn new(client: HttpClient, engine: Arc<dyn Engine>) -> Self {
        Self { client, engine }
    }
}

#[async_trait]
impl SearchClient for EngineSearchClient {
    async fn search(&self, params: &PageRequest) -> anyhow::Result<SearchOutcome> {
        let engine_name = self.engine.name();

        if let Err(failure) = self.engine.validate() {
            error!("Engine {} cannot search: {}", engine_name, failure);
            return Ok(SearchOutcome::Failure(failure));
        }

        let request = self.engine.request(params)?;
        let timeout = clamp_secs("Engine timeout", self.engine.timeout());
        let start = Instant::now();

        debug!(
            start_index = params.start_index,
            num = params.page_size,
            "Searching engine {} with timeout {:?}",
            engine_name,
            timeout
        );

        match self.client.execute_with_timeout(request, timeout).await {
            Ok(response) => {
                debug!(
                    status = response.status,
                    "Engine {} responded in {:?}",
                    engine_name,
                    start.elapsed()
                );
                Ok(self.engine.response(response))
            }
            Err(e) => {
                let failure = classify_transport_error(&e);
                error!(
                    start_index = params.start_index,
                    "Search request to {} failed: {}", engine_name, failure
                );
                Ok(SearchOutcome::Failure(failure))
            }
        }
    }
}
