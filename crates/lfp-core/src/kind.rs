//! # Field Kinds and Autofill Hints
//!
//! `FieldKind` is declared per field when a schema is authored.
//! `HintKind` is the reduced vocabulary the external completion service
//! understands. The mapping between them is a fixed table.

use serde::{Deserialize, Serialize};

/// The enumerated type hint sent to the completion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintKind {
    String,
    Number,
    Boolean,
    Date,
}

impl HintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
        }
    }
}

impl std::fmt::Display for HintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The declared kind of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Quantity, weight, mileage. Input strings are coerced to numbers.
    Number,
    /// Checkbox-style flag; may govern conditional requirements.
    Boolean,
    /// Calendar date, `YYYY-MM-DD`.
    Date,
    /// Image string exported by a signature surface; empty means unsigned.
    Signature,
}

impl FieldKind {
    /// The hint advertised to the completion service for this kind.
    pub fn hint(&self) -> HintKind {
        match self {
            Self::Text | Self::Signature => HintKind::String,
            Self::Number => HintKind::Number,
            Self::Boolean => HintKind::Boolean,
            Self::Date => HintKind::Date,
        }
    }

    /// Whether the completion service may propose values for this kind.
    ///
    /// Signatures are captured from the drawing surface only.
    pub fn autofillable(&self) -> bool {
        !matches!(self, Self::Signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_advertised_as_string() {
        assert_eq!(FieldKind::Signature.hint(), HintKind::String);
        assert!(!FieldKind::Signature.autofillable());
        assert!(FieldKind::Number.autofillable());
    }

    #[test]
    fn kinds_deserialize_lowercase() {
        let k: FieldKind = serde_json::from_str("\"date\"").unwrap();
        assert_eq!(k, FieldKind::Date);
        assert_eq!(serde_json::to_string(&HintKind::Boolean).unwrap(), "\"boolean\"");
    }
}
