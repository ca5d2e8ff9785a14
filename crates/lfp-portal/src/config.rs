//! Portal configuration.
//!
//! Everything the host needs is read from the environment once at start-up
//! into a typed [`PortalConfig`]. Nothing downstream reads the environment.

use std::str::FromStr;

use lfp_autofill::AutofillConfig;
use lfp_core::{LfpError, TenantId, UserId};
use url::Url;
use zeroize::Zeroizing;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidLogFormat(other.to_string())),
        }
    }
}

/// Host configuration.
///
/// Custom `Debug` implementation redacts `submission_token`.
#[derive(Clone)]
pub struct PortalConfig {
    pub tenant: TenantId,
    pub user: UserId,
    /// Base URL of the submission service.
    pub submission_url: Url,
    /// Optional bearer token for the submission service.
    pub submission_token: Option<Zeroizing<String>>,
    pub submission_timeout_secs: u64,
    pub log_format: LogFormat,
    /// `EnvFilter` directive string, e.g. `info,lfp_forms=debug`.
    pub log_filter: String,
    /// `None` disables autofill.
    pub autofill: Option<AutofillConfig>,
}

impl std::fmt::Debug for PortalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalConfig")
            .field("tenant", &self.tenant)
            .field("user", &self.user)
            .field("submission_url", &self.submission_url)
            .field(
                "submission_token",
                &self.submission_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("submission_timeout_secs", &self.submission_timeout_secs)
            .field("log_format", &self.log_format)
            .field("log_filter", &self.log_filter)
            .field("autofill", &self.autofill)
            .finish()
    }
}

impl PortalConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `LFP_TENANT_ID` (required)
    /// - `LFP_USER_ID` (required)
    /// - `LFP_SUBMISSION_URL` (required)
    /// - `LFP_SUBMISSION_TOKEN` (optional)
    /// - `LFP_SUBMISSION_TIMEOUT_SECS` (default: 30)
    /// - `LFP_LOG_FORMAT` (`text` or `json`, default: `text`)
    /// - `LFP_LOG` (default: `info`)
    /// - `LFP_AUTOFILL_*`: see `AutofillConfig::from_env`. If the URL or
    ///   token is missing, autofill is disabled.
    ///
    /// # Errors
    ///
    /// Missing required variables, unparseable URLs, blank identifiers, and
    /// unknown log formats. A present but invalid autofill configuration is
    /// also an error; only an absent one disables autofill.
    pub fn from_env() -> Result<Self, ConfigError> {
        let tenant = TenantId::new(required("LFP_TENANT_ID")?)?;
        let user = UserId::new(required("LFP_USER_ID")?)?;
        let raw_url = required("LFP_SUBMISSION_URL")?;
        let submission_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidUrl("LFP_SUBMISSION_URL".to_string(), e.to_string()))?;

        let autofill = match AutofillConfig::from_env() {
            Ok(config) => Some(config),
            Err(lfp_autofill::ConfigError::Missing(_)) => None,
            Err(e) => return Err(ConfigError::Autofill(e)),
        };

        Ok(Self {
            tenant,
            user,
            submission_url,
            submission_token: std::env::var("LFP_SUBMISSION_TOKEN")
                .ok()
                .filter(|t| !t.is_empty())
                .map(Zeroizing::new),
            submission_timeout_secs: std::env::var("LFP_SUBMISSION_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(30),
            log_format: std::env::var("LFP_LOG_FORMAT")
                .map(|s| s.parse())
                .unwrap_or(Ok(LogFormat::Text))?,
            log_filter: std::env::var("LFP_LOG").unwrap_or_else(|_| "info".to_string()),
            autofill,
        })
    }

    /// Configuration pointing at local mock servers (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if a localhost URL cannot be parsed.
    pub fn local_mock(submission_port: u16, autofill_port: Option<u16>) -> Result<Self, ConfigError> {
        let submission_url = Url::parse(&format!("http://127.0.0.1:{submission_port}"))
            .map_err(|e| ConfigError::InvalidUrl("localhost".to_string(), e.to_string()))?;
        let autofill = autofill_port
            .map(|port| AutofillConfig::local_mock(port, "test-token"))
            .transpose()
            .map_err(ConfigError::Autofill)?;
        Ok(Self {
            tenant: TenantId::new("tenant-test")?,
            user: UserId::new("driver-test")?,
            submission_url,
            submission_token: None,
            submission_timeout_secs: 5,
            log_format: LogFormat::Text,
            log_filter: "debug".to_string(),
            autofill,
        })
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(var))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("unknown log format {0:?} (expected \"text\" or \"json\")")]
    InvalidLogFormat(String),
    #[error(transparent)]
    Identifier(#[from] LfpError),
    #[error("autofill configuration: {0}")]
    Autofill(lfp_autofill::ConfigError),
}
