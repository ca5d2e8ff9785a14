//! Completion service configuration.
//!
//! Loaded from the environment by the host. The bearer token is held in a
//! `Zeroizing` buffer and never printed.

use url::Url;
use zeroize::Zeroizing;

/// Connection settings for the completion service.
///
/// Custom `Debug` implementation redacts `api_token`.
#[derive(Clone)]
pub struct AutofillConfig {
    /// Base URL; requests go to `{base_url}/v1/autofill`.
    pub base_url: Url,
    /// Bearer token for the service.
    pub api_token: Zeroizing<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries after a transport failure. HTTP error statuses are never
    /// retried.
    pub max_retries: u32,
}

impl std::fmt::Debug for AutofillConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutofillConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Ceiling on `max_retries` read from the environment.
pub const MAX_RETRIES: u32 = 10;

impl AutofillConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `LFP_AUTOFILL_URL` (required)
    /// - `LFP_AUTOFILL_TOKEN` (required)
    /// - `LFP_AUTOFILL_TIMEOUT_SECS` (default: 30)
    /// - `LFP_AUTOFILL_MAX_RETRIES` (default: 2, at most [`MAX_RETRIES`])
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url = std::env::var("LFP_AUTOFILL_URL")
            .map_err(|_| ConfigError::Missing("LFP_AUTOFILL_URL"))?;
        let base_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidUrl("LFP_AUTOFILL_URL".to_string(), e.to_string()))?;
        let api_token = std::env::var("LFP_AUTOFILL_TOKEN")
            .map_err(|_| ConfigError::Missing("LFP_AUTOFILL_TOKEN"))?;

        Ok(Self {
            base_url,
            api_token: Zeroizing::new(api_token),
            timeout_secs: env_parse("LFP_AUTOFILL_TIMEOUT_SECS", 30),
            max_retries: env_parse("LFP_AUTOFILL_MAX_RETRIES", 2u32).min(MAX_RETRIES),
        })
    }

    /// Configuration pointing at a local mock server (for testing). No
    /// retries, short timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the localhost URL cannot be
    /// parsed.
    pub fn local_mock(port: u16, token: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&format!("http://127.0.0.1:{port}"))
            .map_err(|e| ConfigError::InvalidUrl("localhost".to_string(), e.to_string()))?;
        Ok(Self {
            base_url,
            api_token: Zeroizing::new(token.to_string()),
            timeout_secs: 5,
            max_retries: 0,
        })
    }

    /// Full URL of the autofill endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/v1/autofill", self.base_url.as_str().trim_end_matches('/'))
    }
}

fn env_parse<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("LFP_AUTOFILL_TOKEN contains characters not allowed in a header")]
    InvalidToken,
    #[error("failed to build HTTP client: {0}")]
    ClientInit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_mock_builds_valid_config() {
        let cfg = AutofillConfig::local_mock(9400, "test-token").unwrap();
        assert_eq!(cfg.api_token.as_str(), "test-token");
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.max_retries, 0);
        assert_eq!(cfg.endpoint(), "http://127.0.0.1:9400/v1/autofill");
    }

    #[test]
    fn endpoint_joins_base_with_path() {
        let mut cfg = AutofillConfig::local_mock(1, "t").unwrap();
        cfg.base_url = Url::parse("https://fill.example.com/api/").unwrap();
        assert_eq!(cfg.endpoint(), "https://fill.example.com/api/v1/autofill");
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = AutofillConfig::local_mock(9400, "super-secret").unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn from_env_caps_retry_count() {
        std::env::set_var("LFP_AUTOFILL_URL", "https://fill.example.com");
        std::env::set_var("LFP_AUTOFILL_TOKEN", "t");
        std::env::set_var("LFP_AUTOFILL_MAX_RETRIES", "64");
        let cfg = AutofillConfig::from_env().unwrap();
        assert_eq!(cfg.max_retries, MAX_RETRIES);
        for var in ["LFP_AUTOFILL_URL", "LFP_AUTOFILL_TOKEN", "LFP_AUTOFILL_MAX_RETRIES"] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn env_parse_falls_back_on_garbage() {
        std::env::set_var("LFP_TEST_AUTOFILL_TIMEOUT", "soon");
        assert_eq!(env_parse("LFP_TEST_AUTOFILL_TIMEOUT", 30u64), 30);
        std::env::set_var("LFP_TEST_AUTOFILL_TIMEOUT", " 12 ");
        assert_eq!(env_parse("LFP_TEST_AUTOFILL_TIMEOUT", 30u64), 12);
        std::env::remove_var("LFP_TEST_AUTOFILL_TIMEOUT");
    }
}
