//! # Field Rules
//!
//! Pure, per-field validation. A rule check sees one value and whether the
//! field's governing flag (if it has one) is currently on; it never looks
//! at the rest of the document and never mutates anything.
//!
//! ## Numeric semantics
//!
//! Number fields accept numbers or numeric text. Blank input is NOT zero:
//! it is absent, which fails a required rule. The one exception is a field
//! whose declared default is exactly `0`, where blank input reads as `0`.

use chrono::NaiveDate;
use lfp_core::{FieldKind, FieldValue};

use crate::form::FieldSpec;

/// Why a field value is invalid. `Display` is the user-facing message.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleViolation {
    Required,
    NotANumber,
    BelowMinimum { min: f64 },
    InvalidDate,
    InvalidBoolean,
}

impl std::fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required => f.write_str("is required"),
            Self::NotANumber => f.write_str("must be a number"),
            Self::BelowMinimum { min } => write!(f, "must be at least {min}"),
            Self::InvalidDate => f.write_str("must be a date (YYYY-MM-DD)"),
            Self::InvalidBoolean => f.write_str("must be true or false"),
        }
    }
}

/// Coerce a raw value to a number.
///
/// Returns `Ok(None)` for blank input (absent), `Ok(Some(0.0))` for blank
/// input when `zero_default` is set.
///
/// # Errors
///
/// `RuleViolation::NotANumber` for unparseable text, booleans, and
/// non-finite numbers.
pub fn coerce_number(value: &FieldValue, zero_default: bool) -> Result<Option<f64>, RuleViolation> {
    if value.is_empty() {
        return Ok(zero_default.then_some(0.0));
    }
    match value {
        FieldValue::Number(n) if n.is_finite() => Ok(Some(*n)),
        FieldValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or(RuleViolation::NotANumber),
        _ => Err(RuleViolation::NotANumber),
    }
}

impl FieldSpec {
    /// Check `value` against this field's rules.
    ///
    /// `governing_on` is the current state of the field named by
    /// `required_when`; it is ignored for unconditional fields. A
    /// conditional field whose flag is off is not checked at all, so
    /// stale input it still holds cannot fail the form.
    pub fn check(&self, value: &FieldValue, governing_on: bool) -> Option<RuleViolation> {
        if self.required_when.is_some() && !governing_on && !self.required {
            return None;
        }
        let required = self.required || (self.required_when.is_some() && governing_on);

        match self.kind {
            FieldKind::Number => match coerce_number(value, self.has_zero_default()) {
                Ok(Some(n)) => match self.min {
                    Some(min) if n < min => Some(RuleViolation::BelowMinimum { min }),
                    _ => None,
                },
                Ok(None) => required.then_some(RuleViolation::Required),
                Err(v) => Some(v),
            },
            FieldKind::Boolean => {
                if value.is_empty() {
                    return required.then_some(RuleViolation::Required);
                }
                match value.as_bool() {
                    Some(_) => None,
                    None => Some(RuleViolation::InvalidBoolean),
                }
            }
            FieldKind::Date => {
                if value.is_empty() {
                    return required.then_some(RuleViolation::Required);
                }
                let parsed = value
                    .as_text()
                    .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok());
                match parsed {
                    Some(_) => None,
                    None => Some(RuleViolation::InvalidDate),
                }
            }
            FieldKind::Text | FieldKind::Signature => {
                (required && value.is_empty()).then_some(RuleViolation::Required)
            }
        }
    }

    /// Whether the declared default is exactly numeric zero.
    pub fn has_zero_default(&self) -> bool {
        matches!(self.default, Some(FieldValue::Number(n)) if n == 0.0)
    }
}
