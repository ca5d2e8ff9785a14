//! # Autofill Wire Contract
//!
//! The request shape sent to the external completion service, and the
//! transport failures a completion call can report. Both live here so the
//! form engine (which builds requests and consumes results) and the HTTP
//! transport (which carries them) share one definition without depending
//! on each other.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request body for the completion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutofillRequest {
    /// Simplified description of the form schema, one field per line.
    pub simplified_schema: String,
    /// JSON snapshot of the current document, if any values are set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_state_json: Option<String>,
    /// Free-text hint from the user ("load of 20 drums of paint to Dallas").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_hint: Option<String>,
}

/// A completion call that did not produce a usable JSON object.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The service could not be reached.
    #[error("completion service unreachable at {endpoint}: {reason}")]
    Unreachable { endpoint: String, reason: String },

    /// The service answered with a non-success status.
    #[error("completion service error at {endpoint}: HTTP {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The response body could not be decoded.
    #[error("failed to decode completion response from {endpoint}: {reason}")]
    Deserialization { endpoint: String, reason: String },

    /// The response decoded but did not contain a JSON object candidate.
    #[error("completion response is not a JSON object: {0}")]
    MalformedResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_and_skips_absent_fields() {
        let req = AutofillRequest {
            simplified_schema: "shipperName: string".into(),
            prior_state_json: None,
            domain_hint: Some("20 drums of paint".into()),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["simplifiedSchema"], "shipperName: string");
        assert_eq!(json["domainHint"], "20 drums of paint");
        assert!(json.get("priorStateJson").is_none());
    }
}
