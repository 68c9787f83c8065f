//! Dashboard configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `DASHBOARD_API_URL` - Backend base URL (default: `http://127.0.0.1:8000`)
//! - `DASHBOARD_PAGE_SIZE` - Backend page size (default: 50)
//! - `DASHBOARD_REFRESH_SECS` - Auto-refresh period in seconds (default: 30)
//! - `DASHBOARD_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 30)
//! - `DASHBOARD_LOG_JSON` - Emit JSON logs when set to `1` or `true`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)

use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_PAGE_SIZE: u32 = 50;
const DEFAULT_REFRESH_SECS: u64 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Dashboard configuration.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Backend API client settings
    pub api: ApiConfig,
    /// Period of the auto-refresh timer
    pub refresh_interval: Duration,
    /// Emit JSON-formatted logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
}

/// Backend API client settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the backend, always ending in `/`
    pub base_url: Url,
    /// Number of products per backend page
    pub page_size: u32,
    /// Timeout applied to every request
    pub request_timeout: Duration,
}

impl ApiConfig {
    /// Settings for `base_url` with default page size and timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("DASHBOARD_API_URL", base_url)?,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }
}

impl DashboardConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("DASHBOARD_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = parse_base_url("DASHBOARD_API_URL", &api_url)?;

        let page_size = parse_positive(&lookup, "DASHBOARD_PAGE_SIZE", DEFAULT_PAGE_SIZE.into())?;
        let page_size = u32::try_from(page_size).map_err(|e| {
            ConfigError::InvalidEnvVar("DASHBOARD_PAGE_SIZE".to_string(), e.to_string())
        })?;
        let refresh_secs = parse_positive(&lookup, "DASHBOARD_REFRESH_SECS", DEFAULT_REFRESH_SECS)?;
        let timeout_secs = parse_positive(
            &lookup,
            "DASHBOARD_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        let log_json = lookup("DASHBOARD_LOG_JSON")
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));
        let sentry_sample_rate = lookup("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            api: ApiConfig {
                base_url,
                page_size,
                request_timeout: Duration::from_secs(timeout_secs),
            },
            refresh_interval: Duration::from_secs(refresh_secs),
            log_json,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
        })
    }

    /// Replace the backend base URL (e.g. from a command-line flag).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `url` is not an http(s) URL.
    pub fn with_api_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api.base_url = parse_base_url("--api-url", url)?;
        Ok(self)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an http(s) base URL, ensuring a trailing slash so relative joins
/// keep any path prefix.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Parse a strictly positive integer, falling back to `default` when unset.
fn parse_positive(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let value = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if value == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<DashboardConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        DashboardConfig::from_source(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://127.0.0.1:8000/");
        assert_eq!(config.api.page_size, 50);
        assert_eq!(config.api.request_timeout, Duration::from_secs(30));
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert!(!config.log_json);
        assert!(config.sentry_dsn.is_none());
        assert!((config.sentry_sample_rate - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DASHBOARD_API_URL", "https://analytics.example.com/wb"),
            ("DASHBOARD_PAGE_SIZE", "20"),
            ("DASHBOARD_REFRESH_SECS", "5"),
            ("DASHBOARD_LOG_JSON", "true"),
            ("SENTRY_SAMPLE_RATE", "0.25"),
        ])
        .unwrap();
        assert_eq!(config.api.base_url.as_str(), "https://analytics.example.com/wb/");
        assert_eq!(config.api.page_size, 20);
        assert_eq!(config.refresh_interval, Duration::from_secs(5));
        assert!(config.log_json);
        assert!((config.sentry_sample_rate - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zero_refresh_rejected() {
        let err = load(&[("DASHBOARD_REFRESH_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "DASHBOARD_REFRESH_SECS"));
    }

    #[test]
    fn test_non_numeric_page_size_rejected() {
        let err = load(&[("DASHBOARD_PAGE_SIZE", "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_bad_scheme_rejected() {
        let err = load(&[("DASHBOARD_API_URL", "ftp://example.com")]).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_with_api_url() {
        let config = load(&[])
            .unwrap()
            .with_api_url("http://localhost:9000")
            .unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:9000/");
    }

    #[test]
    fn test_api_config_new() {
        let api = ApiConfig::new("http://localhost:8000/prefix").unwrap();
        assert_eq!(api.base_url.as_str(), "http://localhost:8000/prefix/");
        assert_eq!(api.page_size, DEFAULT_PAGE_SIZE);
    }
}
