//! Engine traits and types

use crate::results::{SearchFailure, SearchOutcome};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters for one paginated search request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Search query string
    pub query: String,
    /// Results requested for this page
    pub page_size: u32,
    /// 1-based index of the first result on this page
    pub start_index: u32,
    /// Restrict results to one site
    pub site_search: Option<String>,
}

impl PageRequest {
    /// First page of `page_size` results
    pub fn new(query: impl Into<String>, page_size: u32) -> Self {
        Self {
            query: query.into(),
            page_size,
            start_index: 1,
            site_search: None,
        }
    }

    /// Request for the 0-based `page` at a fixed page size
    pub fn for_page(query: impl Into<String>, page: u32, page_size: u32) -> Self {
        Self {
            start_index: page * page_size + 1,
            ..Self::new(query, page_size)
        }
    }

    pub fn with_site(mut self, site: Option<String>) -> Self {
        self.site_search = site;
        self
    }
}

/// HTTP request to be made by the engine
#[derive(Debug, Clone)]
pub struct EngineRequest {
    /// URL to request
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Query parameters
    pub params: HashMap<String, String>,
    /// Request body
    pub data: Option<RequestBody>,
}

impl EngineRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            headers: HashMap::new(),
            params: HashMap::new(),
            data: None,
        }
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            ..Self::get(url)
        }
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add JSON body
    pub fn json(mut self, data: serde_json::Value) -> Self {
        self.data = Some(RequestBody::Json(data));
        self
    }
}

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Request body types
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
}

/// HTTP response from engine request
#[derive(Debug)]
pub struct EngineResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers, names lowercased
    pub headers: HashMap<String, String>,
    /// Response body as text
    pub text: String,
    /// Response URL (after redirects)
    pub url: String,
}

impl EngineResponse {
    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.text)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Lowercased `Content-Type`, empty when absent
    pub fn content_type(&self) -> String {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .map(|(_, v)| v.to_lowercase())
            .unwrap_or_default()
    }
}

/// A paginated search provider
///
/// Building the request may fail for reasons the engine cannot classify
/// (for example an unusable endpoint); parsing the response always yields a
/// [`SearchOutcome`].
pub trait Engine: Send + Sync {
    /// Engine name
    fn name(&self) -> &str;

    /// Largest page the provider serves
    fn max_page_size(&self) -> u32 {
        10
    }

    /// Timeout for one search request in seconds
    fn timeout(&self) -> f64 {
        15.0
    }

    /// Check the engine can issue requests at all, before any HTTP call
    fn validate(&self) -> Result<(), SearchFailure> {
        Ok(())
    }

    /// Build the HTTP request for a search page
    fn request(&self, params: &PageRequest) -> anyhow::Result<EngineRequest>;

    /// Parse the HTTP response into normalized items or a failure
    fn response(&self, response: EngineResponse) -> SearchOutcome;
}

/// Classify an error returned by [`crate::network::HttpClient`]
pub fn classify_transport_error(err: &anyhow::Error) -> SearchFailure {
    match err.downcast_ref::<reqwest::Error>() {
        Some(e) if e.is_timeout() => SearchFailure::Timeout,
        Some(e) if e.is_decode() => SearchFailure::Malformed(e.to_string()),
        Some(e) => match e.status() {
            Some(status) => SearchFailure::HttpError(status.as_u16()),
            None => SearchFailure::NetworkError(e.to_string()),
        },
        None => SearchFailure::NetworkError(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_start_index() {
        assert_eq!(PageRequest::for_page("q", 0, 10).start_index, 1);
        assert_eq!(PageRequest::for_page("q", 1, 10).start_index, 11);
        assert_eq!(PageRequest::for_page("q", 3, 7).start_index, 22);
    }

    #[test]
    fn test_content_type_lookup() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "Text/HTML; charset=UTF-8".to_string());
        let response = EngineResponse {
            status: 200,
            headers,
            text: String::new(),
            url: "https://a.example".to_string(),
        };
        assert_eq!(response.content_type(), "text/html; charset=utf-8");
        assert!(response.is_success());
    }

    #[test]
    fn test_non_reqwest_error_is_network() {
        let err = anyhow::anyhow!("connection reset");
        assert_eq!(
            classify_transport_error(&err),
            SearchFailure::NetworkError("connection reset".to_string())
        );
    }
}
