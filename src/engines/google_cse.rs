//! Google Custom Search JSON API engine
//!
//! Uses the official API (`key` + `cx`), which serves at most 10 results per
//! request and paginates with a 1-based `start` index.

use super::traits::*;
use crate::config::{clamp_secs, Credentials};
use crate::results::{is_valid_link, SearchFailure, SearchOutcome, SearchResultItem, MISSING_FIELD};
use anyhow::Result as AnyhowResult;
use serde_json::Value;
use tracing::{debug, error, warn};
use url::Url;

/// Default Custom Search JSON API endpoint
pub const GOOGLE_CSE_API_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Google Custom Search engine
pub struct GoogleCse {
    api_url: String,
    credentials: Credentials,
    timeout: f64,
}

impl GoogleCse {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            api_url: GOOGLE_CSE_API_URL.to_string(),
            credentials,
            timeout: 15.0,
        }
    }

    /// Point the engine at another endpoint
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set the per-request timeout in seconds
    pub fn with_timeout(mut self, timeout: f64) -> Self {
        self.timeout = clamp_secs("Search API timeout", timeout).as_secs_f64();
        self
    }

    /// Keep items with an http(s) link, filling absent text fields
    fn parse_items(items: &[Value]) -> Vec<SearchResultItem> {
        let mut results = Vec::with_capacity(items.len());

        for item in items {
            let title = item
                .get("title")
                .and_then(|t| t.as_str())
                .unwrap_or(MISSING_FIELD);

            let link = match item.get("link").and_then(|l| l.as_str()) {
                Some(link) if is_valid_link(link) => link,
                _ => {
                    warn!("Skipping result with invalid/missing link: Title '{}'", title);
                    continue;
                }
            };

            let snippet = item
                .get("snippet")
                .and_then(|s| s.as_str())
                .unwrap_or(MISSING_FIELD);

            results.push(SearchResultItem::new(title, link, snippet));
        }

        results
    }

    fn provider_error(error: &Value) -> SearchFailure {
        let code = error.get("code").and_then(|c| c.as_i64());
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error")
            .to_string();
        SearchFailure::Provider { code, message }
    }
}

impl Engine for GoogleCse {
    fn name(&self) -> &str {
        "google_cse"
    }

    fn timeout(&self) -> f64 {
        self.timeout
    }

    fn validate(&self) -> Result<(), SearchFailure> {
        if self.credentials.is_complete() {
            Ok(())
        } else {
            Err(SearchFailure::Provider {
                code: None,
                message: "API Key or CSE ID missing".to_string(),
            })
        }
    }

    fn request(&self, params: &PageRequest) -> AnyhowResult<EngineRequest> {
        let url = Url::parse(&self.api_url)
            .map_err(|e| anyhow::anyhow!("Invalid search API URL '{}': {}", self.api_url, e))?;

        let mut request = EngineRequest::get(url.as_str())
            .param("key", &self.credentials.api_key)
            .param("cx", &self.credentials.cse_id)
            .param("q", &params.query)
            .param("num", params.page_size.min(self.max_page_size()).to_string())
            .param("start", params.start_index.to_string());

        if let Some(ref site) = params.site_search {
            request = request.param("siteSearch", site);
        }

        Ok(request)
    }

    fn response(&self, response: EngineResponse) -> SearchOutcome {
        if !response.is_success() {
            let detail = response
                .json::<Value>()
                .ok()
                .and_then(|v| v.get("error").map(Self::provider_error));
            if let Some(detail) = detail {
                error!("Google API HTTP {}: {}", response.status, detail);
            }
            return SearchOutcome::Failure(SearchFailure::HttpError(response.status));
        }

        let json: Value = match response.json() {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to decode JSON response from CSE API: {}", e);
                return SearchOutcome::Failure(SearchFailure::Malformed(e.to_string()));
            }
        };

        if let Some(err) = json.get("error") {
            let failure = Self::provider_error(err);
            error!("Google API Error: {}", failure);
            return SearchOutcome::Failure(failure);
        }

        match json.get("items") {
            None | Some(Value::Null) => {
                debug!("No search results items found in CSE API response");
                SearchOutcome::Success(Vec::new())
            }
            Some(Value::Array(items)) => SearchOutcome::Success(Self::parse_items(items)),
            Some(other) => SearchOutcome::Failure(SearchFailure::Malformed(format!(
                "'items' is not an array: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn engine() -> GoogleCse {
        GoogleCse::new(Credentials::new("key-1", "cx-1"))
    }

    fn ok(body: &str) -> EngineResponse {
        EngineResponse {
            status: 200,
            headers: HashMap::new(),
            text: body.to_string(),
            url: GOOGLE_CSE_API_URL.to_string(),
        }
    }

    #[test]
    fn test_request_params() {
        let params = PageRequest::for_page("tin giả", 2, 10).with_site(Some("vnexpress.net".into()));
        let request = engine().request(&params).unwrap();

        assert_eq!(request.url, GOOGLE_CSE_API_URL);
        assert_eq!(request.params["key"], "key-1");
        assert_eq!(request.params["cx"], "cx-1");
        assert_eq!(request.params["q"], "tin giả");
        assert_eq!(request.params["num"], "10");
        assert_eq!(request.params["start"], "21");
        assert_eq!(request.params["siteSearch"], "vnexpress.net");
    }

    #[test]
    fn test_request_without_site() {
        let request = engine().request(&PageRequest::new("q", 5)).unwrap();
        assert!(!request.params.contains_key("siteSearch"));
        assert_eq!(request.params["num"], "5");
    }

    #[test]
    fn test_request_invalid_api_url() {
        let engine = engine().with_api_url("not a url");
        assert!(engine.request(&PageRequest::new("q", 10)).is_err());
    }

    #[test]
    fn test_timeout_is_clamped() {
        assert_eq!(engine().with_timeout(f64::INFINITY).timeout(), 86_400.0);
        assert_eq!(engine().with_timeout(f64::NAN).timeout(), 0.0);
        assert_eq!(engine().with_timeout(7.5).timeout(), 7.5);
    }

    #[test]
    fn test_validate_requires_credentials() {
        assert!(engine().validate().is_ok());
        let missing = GoogleCse::new(Credentials::new("", "cx"));
        assert!(matches!(
            missing.validate(),
            Err(SearchFailure::Provider { .. })
        ));
    }

    #[test]
    fn test_response_drops_invalid_links() {
        let body = r#"{"items": [
            {"title": "A", "link": "https://a.example", "snippet": "s1"},
            {"title": "B", "link": "ftp://bad", "snippet": "s2"},
            {"title": "C"},
            {"link": "http://d.example"}
        ]}"#;

        match engine().response(ok(body)) {
            SearchOutcome::Success(items) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0], SearchResultItem::new("A", "https://a.example", "s1"));
                assert_eq!(items[1].title, "N/A");
                assert_eq!(items[1].snippet, "N/A");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_response_without_items_is_empty_success() {
        let outcome = engine().response(ok(r#"{"searchInformation": {"totalResults": "0"}}"#));
        assert_eq!(outcome, SearchOutcome::Success(vec![]));
    }

    #[test]
    fn test_response_api_error() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded"}}"#;
        assert_eq!(
            engine().response(ok(body)),
            SearchOutcome::Failure(SearchFailure::Provider {
                code: Some(429),
                message: "Quota exceeded".to_string(),
            })
        );
    }

    #[test]
    fn test_response_malformed_json() {
        assert!(matches!(
            engine().response(ok("<html>oops</html>")),
            SearchOutcome::Failure(SearchFailure::Malformed(_))
        ));
    }

    #[test]
    fn test_response_http_error() {
        let response = EngineResponse {
            status: 403,
            headers: HashMap::new(),
            text: r#"{"error": {"code": 403, "message": "forbidden"}}"#.to_string(),
            url: GOOGLE_CSE_API_URL.to_string(),
        };
        assert_eq!(
            engine().response(response),
            SearchOutcome::Failure(SearchFailure::HttpError(403))
        );
    }
}
