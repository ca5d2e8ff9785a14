//! Completion service trait and its HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use lfp_core::{AutofillRequest, TransportError};
use serde_json::Value;

use crate::candidate::extract_candidate;
use crate::config::{AutofillConfig, ConfigError};

/// Anything that can turn an autofill request into a candidate object.
///
/// Implementations report every failure as a `TransportError`; they never
/// judge whether the candidate fits the form.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &AutofillRequest) -> Result<Value, TransportError>;
}

/// reqwest-backed client for `POST {base_url}/v1/autofill`.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    url: String,
    max_retries: u32,
}

impl CompletionClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidToken` if the token cannot be sent as a header,
    /// `ConfigError::ClientInit` if the HTTP client fails to build.
    pub fn new(config: &AutofillConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                let mut auth = reqwest::header::HeaderValue::from_str(&format!(
                    "Bearer {}",
                    config.api_token.as_str()
                ))
                .map_err(|_| ConfigError::InvalidToken)?;
                auth.set_sensitive(true);
                headers.insert(reqwest::header::AUTHORIZATION, auth);
                headers
            })
            .build()
            .map_err(|e| ConfigError::ClientInit(e.to_string()))?;

        Ok(Self {
            http,
            url: config.endpoint(),
            max_retries: config.max_retries,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CompletionService for CompletionClient {
    async fn complete(&self, request: &AutofillRequest) -> Result<Value, TransportError> {
        let resp = crate::retry::retry_send(self.max_retries, || {
            self.http.post(&self.url).json(request).send()
        })
        .await
        .map_err(|e| TransportError::Unreachable {
            endpoint: self.url.clone(),
            reason: e.to_string(),
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Api {
                endpoint: self.url.clone(),
                status,
                body,
            });
        }

        let body: Value = resp.json().await.map_err(|e| TransportError::Deserialization {
            endpoint: self.url.clone(),
            reason: e.to_string(),
        })?;
        tracing::debug!(endpoint = %self.url, "completion response received");
        extract_candidate(body)
    }
}
