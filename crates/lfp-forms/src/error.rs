//! Errors from bulk replacement and autofill.
//!
//! Field-level validation failures are never errors here: they are
//! markers in a [`ValidationReport`](crate::ValidationReport). These enums
//! cover operations that did not take effect at all, and in every case the
//! document is left exactly as it was.

use lfp_core::{LfpError, TransportError};
use lfp_schema::ShapeError;
use thiserror::Error;

/// A replacement document was rejected.
#[derive(Error, Debug, Clone)]
pub enum ReplaceError {
    /// The candidate does not conform to the form's JSON shape.
    #[error("replacement rejected: {0}")]
    Shape(#[from] ShapeError),

    /// The candidate passed the shape check but could not be converted.
    #[error("replacement rejected: {0}")]
    Conversion(#[from] LfpError),

    /// An autofill candidate tried to write a field that only the user may
    /// fill, such as a signature.
    #[error("replacement rejected: field '{field}' cannot be autofilled")]
    NotAutofillable { field: String },
}

/// An autofill result that was not applied.
#[derive(Error, Debug, Clone)]
pub enum AutofillError {
    /// The document changed, or a newer autofill started, after this
    /// request was issued.
    #[error("autofill result for generation {ticket} is stale (document is at generation {current})")]
    Stale { ticket: u64, current: u64 },

    /// The completion service could not produce a candidate.
    #[error("autofill transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The candidate failed the form's own checks.
    #[error("autofill candidate violates the form contract: {0}")]
    ContractViolation(#[from] ReplaceError),
}

/// Shown to the user when an autofill did not apply.
pub const AUTOFILL_FAILED_NOTICE: &str =
    "Autofill could not complete. Your form has not been changed.";

impl AutofillError {
    /// The notice to surface to the user, if any. Stale results are
    /// discarded silently.
    pub fn user_notice(&self) -> Option<&'static str> {
        match self {
            Self::Stale { .. } => None,
            Self::Transport(_) | Self::ContractViolation(_) => Some(AUTOFILL_FAILED_NOTICE),
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }
}
