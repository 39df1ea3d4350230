//! HTTP client shared by the search engine and the page fetchers

use super::user_agent::{accept_html, generate_user_agent, ACCEPT_LANGUAGE};
use crate::config::OutgoingSettings;
use crate::engines::{EngineRequest, EngineResponse, HttpMethod, RequestBody};
use anyhow::Result;
use reqwest::{redirect, Client, Response};
use std::collections::HashMap;
use std::time::Duration;

/// User agent setting value that asks for a generated browser string
pub const RANDOM_USER_AGENT: &str = "random";

/// HTTP client wrapper carrying the outgoing settings
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout))
            .redirect(redirect::Policy::limited(settings.max_redirects))
            .gzip(true)
            .brotli(true);

        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        let client = builder.build()?;

        let user_agent = if settings.user_agent.eq_ignore_ascii_case(RANDOM_USER_AGENT) {
            generate_user_agent()
        } else {
            settings.user_agent.clone()
        };

        Ok(Self {
            client,
            user_agent,
        })
    }

    /// Execute an engine request with custom timeout
    ///
    /// Transport failures surface as a `reqwest::Error` inside the
    /// `anyhow::Error`, so callers can downcast to classify them.
    pub async fn execute_with_timeout(
        &self,
        request: EngineRequest,
        timeout: Duration,
    ) -> Result<EngineResponse> {
        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        req_builder = req_builder
            .timeout(timeout)
            .header("User-Agent", &self.user_agent)
            .header("Accept", accept_html())
            .header("Accept-Language", ACCEPT_LANGUAGE);

        for (key, value) in &request.headers {
            req_builder = req_builder.header(key, value);
        }

        if !request.params.is_empty() {
            req_builder = req_builder.query(&request.params);
        }

        if let Some(RequestBody::Json(json)) = request.data {
            req_builder = req_builder.json(&json);
        }

        let response = req_builder.send().await?;

        Self::parse_response(response).await
    }

    /// GET request with a per-call timeout
    pub async fn get_with_timeout(&self, url: &str, timeout: Duration) -> Result<EngineResponse> {
        self.execute_with_timeout(EngineRequest::get(url), timeout)
            .await
    }

    /// Parse response into EngineResponse
    async fn parse_response(response: Response) -> Result<EngineResponse> {
        let status = response.status().as_u16();
        let url = response.url().to_string();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string(), v.to_string());
            }
        }

        let text = response.text().await?;

        Ok(EngineResponse {
            status,
            headers,
            text,
            url,
        })
    }

    /// Get current user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
