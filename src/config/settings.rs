//! Settings structures for cse-harvest configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the Custom Search API key
pub const API_KEY_ENV: &str = "GOOGLE_CUSTOM_SEARCH_API_KEY";

/// Environment variable holding the search engine (cx) identifier
pub const CSE_ID_ENV: &str = "GOOGLE_CSE_ID";

/// Desktop Chrome user agent sent when fetching pages
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main settings structure, loadable from `settings.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub search: SearchSettings,
    pub outgoing: OutgoingSettings,
    pub input: InputSettings,
    pub output: OutputSettings,
    pub rendering: RenderingSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Merge with environment variables (CSE_HARVEST_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("CSE_HARVEST_LOG_LEVEL") {
            self.general.log_level = val;
        }
        if let Ok(val) = std::env::var("CSE_HARVEST_API_URL") {
            self.search.api_url = val;
        }
        if let Ok(val) = std::env::var("CSE_HARVEST_INPUT") {
            self.input.path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("CSE_HARVEST_USER_AGENT") {
            self.outgoing.user_agent = val;
        }
        if let Ok(val) = std::env::var("CSE_HARVEST_RENDER_ENDPOINT") {
            self.rendering.endpoint = Some(val);
        }
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Search provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Custom Search JSON API endpoint
    pub api_url: String,
    /// Timeout for one search request (seconds)
    pub api_timeout: f64,
    /// Results per page; the API accepts 1-10
    pub results_per_page: i64,
    /// Delay between queries (seconds)
    pub request_delay: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_url: "https://www.googleapis.com/customsearch/v1".to_string(),
            api_timeout: 15.0,
            results_per_page: 10,
            request_delay: 1.0,
        }
    }
}

/// Outgoing page fetch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Timeout for fetching each page (seconds)
    pub request_timeout: u64,
    /// User agent string; `random` picks a realistic one per client
    pub user_agent: String,
    /// Verify TLS certificates
    pub verify_ssl: bool,
    /// Redirects followed before giving up on a page
    pub max_redirects: usize,
    /// Proxy settings
    pub proxies: ProxySettings,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 15,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            verify_ssl: true,
            max_redirects: 10,
            proxies: ProxySettings::default(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Query input settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// JSON Lines or JSON array file holding the query records
    pub path: PathBuf,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/vifactcheck.jsonl"),
        }
    }
}

/// Batch output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Base path for raw search batches
    pub search_base: PathBuf,
    /// Base path for extracted text batches
    pub extracted_base: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            search_base: PathBuf::from("results/raw_search"),
            extracted_base: PathBuf::from("results/extracted_text"),
        }
    }
}

/// JS-rendering extraction, used only for allowlisted domains
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingSettings {
    /// Rendering service endpoint returning page HTML (browserless `/content` style)
    pub endpoint: Option<String>,
    /// Time the renderer waits for dynamic content (seconds)
    pub wait_seconds: f64,
    /// Timeout for one rendering call (seconds)
    pub timeout: u64,
    /// Domains routed through the renderer
    pub domains: Vec<String>,
}

impl Default for RenderingSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            wait_seconds: 2.0,
            timeout: 30,
            domains: Vec::new(),
        }
    }
}

impl RenderingSettings {
    /// Rendering is wired in only with an endpoint and at least one domain
    pub fn is_enabled(&self) -> bool {
        self.endpoint.as_deref().is_some_and(|e| !e.is_empty()) && !self.domains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.search.results_per_page, 10);
        assert_eq!(settings.search.request_delay, 1.0);
        assert_eq!(settings.outgoing.request_timeout, 15);
        assert_eq!(settings.output.search_base, PathBuf::from("results/raw_search"));
        assert_eq!(
            settings.output.extracted_base,
            PathBuf::from("results/extracted_text")
        );
        assert!(!settings.rendering.is_enabled());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "search:\n  results_per_page: 5\nrendering:\n  endpoint: http://localhost:3000/content\n  domains: [baothanhhoa.vn]"
        )
        .unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.search.results_per_page, 5);
        assert_eq!(settings.search.api_timeout, 15.0);
        assert_eq!(settings.general.log_level, "info");
        assert!(settings.rendering.is_enabled());
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "search: [not, a, map]").unwrap();

        let err = Settings::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = Settings::from_file("/nonexistent/settings.yml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
