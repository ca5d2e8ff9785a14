//! # Error Types
//!
//! Structural errors shared across the portal crates. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! Field-level validation failures are NOT errors in this sense: they are
//! surfaced as per-field messages keyed by a `FieldPath` and never halt
//! the rest of a document. The variants here describe misuse of the API
//! (addressing a field the schema does not declare) or malformed input at
//! a trust boundary.

use thiserror::Error;

/// Top-level error type for the forms portal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LfpError {
    /// The schema declares no scalar field with this name.
    #[error("unknown field '{name}' on form '{form_type}'")]
    UnknownField {
        /// Form type the lookup was made against.
        form_type: String,
        /// Field name that was not found.
        name: String,
    },

    /// The schema declares no repeating group with this name.
    #[error("unknown line-item group '{group}' on form '{form_type}'")]
    UnknownGroup {
        /// Form type the lookup was made against.
        form_type: String,
        /// Group name that was not found.
        group: String,
    },

    /// No line item with this identity exists in the group.
    #[error("no line item {item} in group '{group}'")]
    UnknownLineItem {
        /// Group that was searched.
        group: String,
        /// Identity that was not found.
        item: String,
    },

    /// An identifier failed its format check.
    #[error("invalid {kind} identifier: {value:?}")]
    InvalidIdentifier {
        /// Identifier namespace, e.g. "form type".
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// A JSON value could not be represented as a field value.
    #[error("unrepresentable field value: {0}")]
    UnrepresentableValue(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for LfpError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
