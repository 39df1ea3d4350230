//! Plain HTTP page fetch followed by main-text extraction

use super::html::extract_main_text;
use super::TextExtractor;
use crate::network::HttpClient;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Fetches pages with [`HttpClient`] and extracts their main text
#[derive(Clone)]
pub struct HttpTextExtractor {
    client: HttpClient,
}

impl HttpTextExtractor {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

/// Whether a content type can carry extractable markup
pub fn is_markup_content_type(content_type: &str) -> bool {
    content_type.contains("html") || content_type.contains("xml")
}

#[async_trait]
impl TextExtractor for HttpTextExtractor {
    async fn extract(&self, url: &str, timeout: Duration) -> Option<String> {
        debug!(url, "Attempting text extraction");

        let response = match self.client.get_with_timeout(url, timeout).await {
            Ok(response) => response,
            Err(e) => {
                match e.downcast_ref::<reqwest::Error>() {
                    Some(re) if re.is_timeout() => {
                        error!(url, "Timeout occurred while fetching URL for extraction")
                    }
                    Some(re) if re.is_redirect() => error!(url, "Too many redirects for URL"),
                    _ => error!(url, "Extraction error fetching page: {}", e),
                }
                return None;
            }
        };

        if !response.is_success() {
            error!(url, status = response.status, "Extraction fetch returned HTTP error");
            return None;
        }

        let content_type = response.content_type();
        if !is_markup_content_type(&content_type) {
            warn!(
                url,
                "Content type '{}' is not HTML/XML. Skipping extraction.", content_type
            );
            return None;
        }

        if response.text.trim().is_empty() {
            warn!(url, "No HTML/text content retrieved");
            return None;
        }

        match extract_main_text(&response.text) {
            Some(text) => {
                debug!(url, chars = text.len(), "Successfully extracted text");
                Some(text)
            }
            None => {
                info!(url, "Found no main text");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve(route: &str, template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    fn extractor() -> HttpTextExtractor {
        HttpTextExtractor::new(HttpClient::new().unwrap())
    }

    #[test]
    fn test_markup_content_types() {
        assert!(is_markup_content_type("text/html; charset=utf-8"));
        assert!(is_markup_content_type("application/xhtml+xml"));
        assert!(is_markup_content_type("application/rss+xml"));
        assert!(!is_markup_content_type("application/pdf"));
        assert!(!is_markup_content_type(""));
    }

    #[tokio::test]
    async fn test_extracts_html_page() {
        let server = serve(
            "/article",
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string("<html><body><p>  Fact check result.  </p></body></html>"),
        )
        .await;

        let text = extractor()
            .extract(&format!("{}/article", server.uri()), Duration::from_secs(5))
            .await;
        assert_eq!(text.as_deref(), Some("Fact check result."));
    }

    #[tokio::test]
    async fn test_non_html_is_none() {
        let server = serve(
            "/report.pdf",
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.4".to_vec()),
        )
        .await;

        let text = extractor()
            .extract(&format!("{}/report.pdf", server.uri()), Duration::from_secs(5))
            .await;
        assert!(text.is_none());
    }

    #[tokio::test]
    async fn test_http_error_is_none() {
        let server = serve("/gone", ResponseTemplate::new(404)).await;

        let text = extractor()
            .extract(&format!("{}/gone", server.uri()), Duration::from_secs(5))
            .await;
        assert!(text.is_none());
    }

    #[tokio::test]
    async fn test_timeout_is_none() {
        let server = serve(
            "/slow",
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<p>late</p>")
                .set_delay(Duration::from_millis(500)),
        )
        .await;

        let text = extractor()
            .extract(&format!("{}/slow", server.uri()), Duration::from_millis(50))
            .await;
        assert!(text.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_none() {
        let text = extractor()
            .extract("http://127.0.0.1:1/nothing", Duration::from_secs(2))
            .await;
        assert!(text.is_none());
    }
}
