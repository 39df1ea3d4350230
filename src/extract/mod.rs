//! Page text extraction
//!
//! A [`TextExtractor`] turns a URL into the main text of the page, or `None`.
//! Extraction never fails the caller: every error is logged and becomes
//! `None`.

mod html;
mod http;
mod rendered;

pub use html::extract_main_text;
pub use http::{is_markup_content_type, HttpTextExtractor};
pub use rendered::{DomainRoutedExtractor, RenderingExtractor};

use crate::config::{clamp_secs, RenderingSettings, MAX_CONFIG_SECS};
use crate::network::HttpClient;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Fetches a page and extracts its main text
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, url: &str, timeout: Duration) -> Option<String>;
}

/// Build the extractor for a run
///
/// Plain HTTP extraction, wrapped in a [`DomainRoutedExtractor`] when a
/// rendering endpoint and domain allowlist are configured.
pub fn build_extractor(client: HttpClient, rendering: &RenderingSettings) -> Arc<dyn TextExtractor> {
    let plain: Arc<dyn TextExtractor> = Arc::new(HttpTextExtractor::new(client.clone()));

    let endpoint = match rendering.endpoint {
        Some(ref endpoint) if rendering.is_enabled() => endpoint,
        _ => return plain,
    };

    info!(
        endpoint = %endpoint,
        domains = ?rendering.domains,
        "Routing allowlisted domains through rendering service"
    );

    let rendered = Arc::new(RenderingExtractor::new(
        client,
        endpoint.clone(),
        clamp_secs("Rendering wait", rendering.wait_seconds),
        Duration::from_secs(rendering.timeout.min(MAX_CONFIG_SECS)),
    ));

    Arc::new(DomainRoutedExtractor::new(
        rendering.domains.clone(),
        rendered,
        plain,
    ))
}
