//! Host-level errors.

use lfp_core::LfpError;
use lfp_forms::{AutofillError, ReplaceError, ValidationReport};
use lfp_schema::SchemaError;

use crate::config::ConfigError;
use crate::sink::SinkError;

/// Failures of a [`FormSession`](crate::FormSession) operation.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Form(#[from] LfpError),

    #[error("field '{0}' is not a signature field")]
    NotASignatureField(String),

    #[error("no signature pad is bound to field '{0}'")]
    NoPadBound(String),

    #[error("autofill is not configured for this portal")]
    AutofillDisabled,

    #[error(transparent)]
    Autofill(#[from] AutofillError),

    #[error("replacement rejected: {0}")]
    Replace(#[from] ReplaceError),

    #[error("form is not ready to submit: {0}")]
    Invalid(ValidationReport),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl SessionError {
    /// Text suitable for showing the user, if any.
    ///
    /// Stale autofill results are dropped silently.
    pub fn user_notice(&self) -> Option<String> {
        match self {
            Self::Autofill(e) => e.user_notice().map(str::to_string),
            Self::AutofillDisabled => Some("Autofill is not available.".to_string()),
            Self::Invalid(_) => Some("Please correct the highlighted fields.".to_string()),
            Self::Sink(_) => Some("The form could not be submitted. Please try again.".to_string()),
            Self::Form(_) | Self::Replace(_) | Self::NotASignatureField(_) | Self::NoPadBound(_) => None,
        }
    }
}

/// Failures assembling a [`Portal`](crate::Portal).
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("autofill client: {0}")]
    AutofillClient(#[from] lfp_autofill::ConfigError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("no form type '{0}' in the catalog")]
    UnknownFormType(String),
}
