//! Submission sink: where a finalized form goes.
//!
//! ## Endpoint
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/v1/tenants/{tenant}/forms/{form_type}/submissions` | Submit a finalized form |
//!
//! The submitting user travels in the `x-lfp-user` header. Submissions are
//! sent once; a submission that may have reached the server is never
//! replayed.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lfp_core::FormInstanceId;
use lfp_forms::FinalizedForm;
use serde::{Deserialize, Serialize};
use url::Url;
use zeroize::Zeroizing;

use crate::config::PortalConfig;
use crate::context::HostContext;

/// Header carrying the submitting user's identifier.
pub const USER_HEADER: &str = "x-lfp-user";

/// Receipt returned by the submission service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionAck {
    pub submission_id: String,
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
}

/// Wire body for a submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionBody<'a> {
    instance_id: FormInstanceId,
    document: &'a serde_json::Value,
}

/// Accepts finalized forms on behalf of a tenant.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit(&self, ctx: &HostContext, form: &FinalizedForm) -> Result<SubmissionAck, SinkError>;
}

/// reqwest-backed sink for the portal's submission service.
#[derive(Debug, Clone)]
pub struct HttpSubmissionSink {
    http: reqwest::Client,
    base_url: Url,
    token: Option<Zeroizing<String>>,
}

impl HttpSubmissionSink {
    /// # Errors
    ///
    /// `SinkError::Config` if the HTTP client fails to build.
    pub fn new(
        base_url: Url,
        token: Option<Zeroizing<String>>,
        timeout_secs: u64,
    ) -> Result<Self, SinkError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SinkError::Config(e.to_string()))?;
        Ok(Self { http, base_url, token })
    }

    pub fn from_config(config: &PortalConfig) -> Result<Self, SinkError> {
        Self::new(
            config.submission_url.clone(),
            config.submission_token.clone(),
            config.submission_timeout_secs,
        )
    }

    /// Submission URL for a tenant and form type.
    ///
    /// Identifiers are pushed as path segments, so they are percent-encoded
    /// and cannot escape the path.
    pub fn submission_url(&self, ctx: &HostContext, form: &FinalizedForm) -> Result<Url, SinkError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SinkError::Config(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend([
                "v1",
                "tenants",
                ctx.tenant.as_str(),
                "forms",
                form.form_type.as_str(),
                "submissions",
            ]);
        Ok(url)
    }
}

#[async_trait]
impl SubmissionSink for HttpSubmissionSink {
    async fn submit(&self, ctx: &HostContext, form: &FinalizedForm) -> Result<SubmissionAck, SinkError> {
        let url = self.submission_url(ctx, form)?;
        let endpoint = format!("POST {}", url.path());
        let user = reqwest::header::HeaderValue::from_str(ctx.user.as_str())
            .map_err(|_| SinkError::InvalidHeader(USER_HEADER))?;

        let mut req = self
            .http
            .post(url)
            .header(USER_HEADER, user)
            .json(&SubmissionBody {
                instance_id: form.instance,
                document: &form.document,
            });
        if let Some(token) = &self.token {
            req = req.bearer_auth(token.as_str());
        }

        let resp = req.send().await.map_err(|e| SinkError::Unreachable {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%endpoint, status, form = %form.instance, "submission rejected");
            return Err(SinkError::Rejected {
                endpoint,
                status,
                body,
            });
        }

        let ack: SubmissionAck = resp.json().await.map_err(|e| SinkError::Deserialization {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;
        tracing::info!(
            %endpoint,
            form = %form.instance,
            submission = %ack.submission_id,
            "form submitted"
        );
        Ok(ack)
    }
}

/// Submission failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SinkError {
    #[error("submission service unreachable at {endpoint}: {reason}")]
    Unreachable { endpoint: String, reason: String },

    #[error("submission rejected at {endpoint}: HTTP {status}: {body}")]
    Rejected {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode submission receipt from {endpoint}: {reason}")]
    Deserialization { endpoint: String, reason: String },

    #[error("{0} header value is not valid")]
    InvalidHeader(&'static str),

    #[error("submission sink configuration: {0}")]
    Config(String),
}
