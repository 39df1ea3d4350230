//! JS-rendering extraction for sites that build their content client-side

use super::html::extract_main_text;
use super::TextExtractor;
use crate::config::MAX_CONFIG_SECS;
use crate::engines::EngineRequest;
use crate::network::HttpClient;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

/// Extracts text from HTML returned by a rendering service
///
/// The service receives `{"url": ..., "waitFor": <ms>}` and answers with the
/// rendered page HTML, as browserless' `/content` endpoint does.
#[derive(Clone)]
pub struct RenderingExtractor {
    client: HttpClient,
    endpoint: String,
    wait: Duration,
    timeout: Duration,
}

impl RenderingExtractor {
    pub fn new(client: HttpClient, endpoint: impl Into<String>, wait: Duration, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            wait,
            timeout,
        }
    }
}

#[async_trait]
impl TextExtractor for RenderingExtractor {
    async fn extract(&self, url: &str, timeout: Duration) -> Option<String> {
        debug!(url, endpoint = %self.endpoint, "Rendering page for extraction");

        let request = EngineRequest::post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(json!({
                "url": url,
                "waitFor": self.wait.as_millis() as u64,
            }));

        // Rendering waits inside the service, so the caller's budget alone is too short
        let budget = self
            .timeout
            .max(timeout.saturating_add(self.wait))
            .min(Duration::from_secs(MAX_CONFIG_SECS));
        let response = match self.client.execute_with_timeout(request, budget).await {
            Ok(response) => response,
            Err(e) => {
                error!(url, "Rendering service request failed: {}", e);
                return None;
            }
        };

        if !response.is_success() {
            error!(url, status = response.status, "Rendering service returned HTTP error");
            return None;
        }

        let text = extract_main_text(&response.text);
        if text.is_none() {
            info!(url, "Found no main text in rendered page");
        }
        text
    }
}

/// Routes allowlisted domains to a rendering extractor
pub struct DomainRoutedExtractor {
    domains: Vec<String>,
    rendered: Arc<dyn TextExtractor>,
    fallback: Arc<dyn TextExtractor>,
}

impl DomainRoutedExtractor {
    pub fn new(
        domains: Vec<String>,
        rendered: Arc<dyn TextExtractor>,
        fallback: Arc<dyn TextExtractor>,
    ) -> Self {
        let domains = domains
            .into_iter()
            .map(|d| d.trim().trim_start_matches('.').to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self {
            domains,
            rendered,
            fallback,
        }
    }

    /// Whether `url`'s host is an allowlisted domain or one of its subdomains
    pub fn should_render(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        let host = host.to_lowercase();

        self.domains.iter().any(|domain| {
            host == *domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

#[async_trait]
impl TextExtractor for DomainRoutedExtractor {
    async fn extract(&self, url: &str, timeout: Duration) -> Option<String> {
        if self.should_render(url) {
            self.rendered.extract(url, timeout).await
        } else {
            self.fallback.extract(url, timeout).await
        }
    }
}
