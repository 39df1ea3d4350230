//! Per-run parameters and provider credentials

use super::settings::{API_KEY_ENV, CSE_ID_ENV};
use crate::error::ConfigError;
use std::time::Duration;
use tracing::warn;

/// Largest page the Custom Search API serves
pub const MAX_PAGE_SIZE: u32 = 10;

/// Longest wait or timeout accepted from configuration (one day)
pub const MAX_CONFIG_SECS: u64 = 86_400;

/// Seconds from configuration as a `Duration`, clamped into `0..=MAX_CONFIG_SECS`
///
/// Negative and NaN values become zero and values past the limit are capped;
/// both corrections are logged as warnings.
pub fn clamp_secs(name: &str, secs: f64) -> Duration {
    if secs > MAX_CONFIG_SECS as f64 {
        warn!(
            "{} ({}) exceeds {} seconds. Setting to {}.",
            name, secs, MAX_CONFIG_SECS, MAX_CONFIG_SECS
        );
        return Duration::from_secs(MAX_CONFIG_SECS);
    }
    match Duration::try_from_secs_f64(secs) {
        Ok(duration) => duration,
        Err(_) => {
            warn!("{} ({}) is not a valid duration. Setting to 0.", name, secs);
            Duration::ZERO
        }
    }
}

/// Provider credentials, required before any query is processed
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub cse_id: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, cse_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            cse_id: cse_id.into(),
        }
    }

    /// Read both secrets from the environment; empty values count as missing
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = read_secret(API_KEY_ENV)?;
        let cse_id = read_secret(CSE_ID_ENV)?;
        Ok(Self { api_key, cse_id })
    }

    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty() && !self.cse_id.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("cse_id", &self.cse_id)
            .finish()
    }
}

fn read_secret(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(ConfigError::MissingSecret(name)),
    }
}

/// Validated parameters driving pagination and batching
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Maximum search pages per query
    pub max_pages: u32,
    /// Results requested per page, within `1..=MAX_PAGE_SIZE`
    pub page_size: u32,
    /// Pause between consecutive queries
    pub delay: Duration,
    /// Timeout for each page fetch
    pub extraction_timeout: Duration,
    /// Restrict results to one site
    pub site_search: Option<String>,
    /// Queries per batch, at least 1
    pub batch_size: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_pages: 1,
            page_size: MAX_PAGE_SIZE,
            delay: Duration::from_secs(1),
            extraction_timeout: Duration::from_secs(15),
            site_search: None,
            batch_size: 10,
        }
    }
}

impl RunConfig {
    /// Build a config from raw user input, correcting out-of-range values
    ///
    /// Page sizes outside `1..=10` fall back to 10, non-positive batch
    /// sizes fall back to 1, and delay and timeout go through [`clamp_secs`].
    /// Each correction is logged as a warning.
    pub fn from_raw(
        pages: i64,
        num_results: i64,
        delay_secs: f64,
        timeout_secs: u64,
        site_search: Option<String>,
        batch_size: i64,
    ) -> Self {
        let page_size = match u32::try_from(num_results) {
            Ok(n) if (1..=MAX_PAGE_SIZE).contains(&n) => n,
            _ => {
                warn!(
                    "Num results ({}) out of range (1-{}). Setting to {}.",
                    num_results, MAX_PAGE_SIZE, MAX_PAGE_SIZE
                );
                MAX_PAGE_SIZE
            }
        };

        let batch_size = match usize::try_from(batch_size) {
            Ok(n) if n >= 1 => n,
            _ => {
                warn!("Batch size ({}) must be positive. Setting to 1.", batch_size);
                1
            }
        };

        let max_pages = u32::try_from(pages.max(0)).unwrap_or(u32::MAX);

        let delay = clamp_secs("Delay", delay_secs);
        let extraction_timeout = clamp_secs("Timeout", timeout_secs as f64);

        Self {
            max_pages,
            page_size,
            delay,
            extraction_timeout,
            site_search: site_search.filter(|s| !s.trim().is_empty()),
            batch_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_values_pass_through() {
        let config = RunConfig::from_raw(3, 5, 0.5, 20, Some("example.com".into()), 4);
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.page_size, 5);
        assert_eq!(config.delay, Duration::from_millis(500));
        assert_eq!(config.extraction_timeout, Duration::from_secs(20));
        assert_eq!(config.site_search.as_deref(), Some("example.com"));
        assert_eq!(config.batch_size, 4);
    }

    #[test]
    fn test_page_size_out_of_range_resets_to_max() {
        assert_eq!(RunConfig::from_raw(1, 0, 1.0, 15, None, 10).page_size, 10);
        assert_eq!(RunConfig::from_raw(1, 11, 1.0, 15, None, 10).page_size, 10);
        assert_eq!(RunConfig::from_raw(1, -3, 1.0, 15, None, 10).page_size, 10);
        assert_eq!(RunConfig::from_raw(1, 1, 1.0, 15, None, 10).page_size, 1);
    }

    #[test]
    fn test_batch_size_non_positive_resets_to_one() {
        assert_eq!(RunConfig::from_raw(1, 10, 1.0, 15, None, 0).batch_size, 1);
        assert_eq!(RunConfig::from_raw(1, 10, 1.0, 15, None, -7).batch_size, 1);
    }

    #[test]
    fn test_negative_pages_and_delay() {
        let config = RunConfig::from_raw(-2, 10, -1.0, 15, Some("  ".into()), 10);
        assert_eq!(config.max_pages, 0);
        assert_eq!(config.delay, Duration::ZERO);
        assert!(config.site_search.is_none());
    }

    #[test]
    fn test_out_of_range_timings_are_clamped() {
        let max = Duration::from_secs(MAX_CONFIG_SECS);

        let config = RunConfig::from_raw(1, 10, 1e20, u64::MAX, None, 10);
        assert_eq!(config.delay, max);
        assert_eq!(config.extraction_timeout, max);

        assert_eq!(RunConfig::from_raw(1, 10, f64::INFINITY, 15, None, 10).delay, max);
        assert_eq!(RunConfig::from_raw(1, 10, f64::NAN, 15, None, 10).delay, Duration::ZERO);
        assert_eq!(
            RunConfig::from_raw(1, 10, f64::NEG_INFINITY, 15, None, 10).delay,
            Duration::ZERO
        );
    }

    #[test]
    fn test_clamp_secs() {
        assert_eq!(clamp_secs("wait", 2.5), Duration::from_millis(2500));
        assert_eq!(clamp_secs("wait", -0.5), Duration::ZERO);
        assert_eq!(clamp_secs("wait", f64::NAN), Duration::ZERO);
        assert_eq!(clamp_secs("wait", f64::INFINITY), Duration::from_secs(MAX_CONFIG_SECS));
    }

    #[test]
    fn test_credentials_debug_redacts_key() {
        let creds = Credentials::new("secret-key", "cx-123");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("cx-123"));
        assert!(creds.is_complete());
        assert!(!Credentials::new("", "cx").is_complete());
    }
}
