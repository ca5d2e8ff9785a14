//! # Shape Validation
//!
//! Whole-document candidates (autofill results, form resets) cross a trust
//! boundary before they replace the visible document. This module derives a
//! JSON Schema (Draft 2020-12) from a form definition, compiles it once,
//! and checks candidates against it.
//!
//! Shape validation is about types and keys only:
//!
//! - the candidate is an object whose keys are a subset of the declared
//!   field and group names (`additionalProperties: false`)
//! - each scalar has a JSON type compatible with its kind
//! - each group is an array of objects with the same per-key typing
//!
//! Requiredness, minimums, and conditional rules are NOT shape concerns;
//! they are reported per field by the engine after the candidate is in.
//!
//! Rejected candidates carry structured violations with the instance path,
//! the schema path, and a human-readable message.

use std::fmt;

use jsonschema::Validator;
use lfp_core::FieldKind;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::error::SchemaError;
use crate::form::{FieldSpec, SchemaDefinition};

/// Numeric text as `coerce_number` reads it: optional sign, digits with an
/// optional fraction (either side of the point may be empty, not both),
/// optional exponent, surrounding whitespace. Blank text means "absent".
const NUMERIC_TEXT_PATTERN: &str =
    r"^\s*([+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?)?\s*$";

/// ISO calendar date with surrounding whitespace, or blank.
const DATE_PATTERN: &str = r"^\s*([0-9]{4}-[0-9]{2}-[0-9]{2})?\s*$";

/// A candidate document that failed shape validation.
#[derive(Error, Debug, Clone)]
pub enum ShapeError {
    /// The candidate is not a JSON object at all.
    #[error("candidate for '{form_type}' is not a JSON object")]
    NotAnObject { form_type: String },

    /// The candidate did not conform to the derived schema.
    #[error("candidate rejected for '{form_type}':\n{violations}")]
    Rejected {
        form_type: String,
        violations: ValidationViolations,
    },
}

/// A single validation violation with structured context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// JSON Pointer path to the violating value in the candidate.
    pub instance_path: String,
    /// JSON Pointer path within the derived schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A compiled shape validator for one form schema.
///
/// `Send + Sync`; built once when the schema is constructed.
pub struct ShapeValidator {
    form_type: String,
    schema: Value,
    validator: Validator,
}

impl fmt::Debug for ShapeValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeValidator")
            .field("form_type", &self.form_type)
            .finish_non_exhaustive()
    }
}

impl ShapeValidator {
    /// Derive and compile the shape schema for a form definition.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ShapeBuild` if the derived schema does not
    /// compile (which indicates a bug in derivation, not in the form).
    pub fn for_definition(definition: &SchemaDefinition) -> Result<Self, SchemaError> {
        let form_type = definition.form_type.to_string();
        let schema = derive_schema(definition);

        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        let validator = opts
            .build(&schema)
            .map_err(|e| SchemaError::ShapeBuild {
                form_type: form_type.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            form_type,
            schema,
            validator,
        })
    }

    /// The derived JSON Schema document.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Check a candidate document.
    ///
    /// # Errors
    ///
    /// Returns `ShapeError::NotAnObject` for non-object candidates and
    /// `ShapeError::Rejected` with every violation otherwise.
    pub fn check(&self, candidate: &Value) -> Result<(), ShapeError> {
        if !candidate.is_object() {
            return Err(ShapeError::NotAnObject {
                form_type: self.form_type.clone(),
            });
        }

        let errors: Vec<Violation> = self
            .validator
            .iter_errors(candidate)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ShapeError::Rejected {
                form_type: self.form_type.clone(),
                violations: ValidationViolations { violations: errors },
            })
        }
    }
}

fn kind_schema(kind: FieldKind) -> Value {
    match kind {
        FieldKind::Text | FieldKind::Signature => json!({ "type": ["string", "null"] }),
        FieldKind::Number => json!({
            "anyOf": [
                { "type": ["number", "null"] },
                { "type": "string", "pattern": NUMERIC_TEXT_PATTERN }
            ]
        }),
        FieldKind::Boolean => json!({ "type": ["boolean", "null"] }),
        FieldKind::Date => json!({
            "anyOf": [
                { "type": "null" },
                { "type": "string", "pattern": DATE_PATTERN }
            ]
        }),
    }
}

fn object_schema(fields: &[FieldSpec], extra: Map<String, Value>) -> Value {
    let mut properties = Map::new();
    for spec in fields {
        properties.insert(spec.name.clone(), kind_schema(spec.kind));
    }
    properties.extend(extra);
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": properties,
    })
}

fn derive_schema(definition: &SchemaDefinition) -> Value {
    let mut groups = Map::new();
    for group in &definition.groups {
        groups.insert(
            group.name.clone(),
            json!({
                "type": "array",
                "items": object_schema(&group.fields, Map::new()),
            }),
        );
    }
    let mut schema = object_schema(&definition.fields, groups);
    if let Value::Object(map) = &mut schema {
        map.insert(
            "$id".to_string(),
            Value::String(format!("urn:lfp:form:{}", definition.form_type)),
        );
        map.insert("title".to_string(), Value::String(definition.title.clone()));
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormSchema, GroupSpec};

    fn schema() -> FormSchema {
        FormSchema::builder("bill_of_lading", "Bill of Lading")
            .field(FieldSpec::text("shipperName"))
            .field(FieldSpec::date("shipDate"))
            .field(FieldSpec::boolean("prepaid"))
            .group(
                GroupSpec::new("lineItems")
                    .field(FieldSpec::number("quantity"))
                    .field(FieldSpec::text("description")),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn accepts_partial_candidate() {
        let s = schema();
        s.shape().check(&json!({ "shipperName": "Acme" })).unwrap();
        s.shape().check(&json!({})).unwrap();
    }

    #[test]
    fn accepts_numeric_text_and_nulls() {
        let s = schema();
        s.shape()
            .check(&json!({
                "shipDate": null,
                "lineItems": [{ "quantity": "12" }, { "quantity": 3, "description": null }]
            }))
            .unwrap();
    }

    #[test]
    fn numeric_text_matches_manual_entry_rules() {
        let s = schema();
        for text in ["12", " 12.5 ", "1e3", "+5", ".5", "5.", "-0.25E-2", ""] {
            assert!(
                crate::rules::coerce_number(&lfp_core::FieldValue::text(text), false).is_ok(),
                "{text:?} should coerce"
            );
            s.shape()
                .check(&json!({ "lineItems": [{ "quantity": text }] }))
                .unwrap_or_else(|e| panic!("{text:?} rejected: {e}"));
        }
        for text in ["lots", "1,000", ".", "e5", "inf", "NaN", "1e"] {
            assert!(s.shape().check(&json!({ "lineItems": [{ "quantity": text }] })).is_err(), "{text:?}");
        }
    }

    #[test]
    fn dates_tolerate_surrounding_whitespace() {
        let s = schema();
        s.shape().check(&json!({ "shipDate": " 2024-03-18 " })).unwrap();
        s.shape().check(&json!({ "shipDate": "" })).unwrap();
    }

    #[test]
    fn rejects_unknown_keys() {
        let s = schema();
        let err = s.shape().check(&json!({ "shipper": "Acme" })).unwrap_err();
        match err {
            ShapeError::Rejected { violations, .. } => assert!(!violations.is_empty()),
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn rejects_wrong_scalar_types() {
        let s = schema();
        assert!(s.shape().check(&json!({ "prepaid": "maybe" })).is_err());
        assert!(s.shape().check(&json!({ "shipDate": "10/15/2026" })).is_err());
        assert!(s.shape().check(&json!({ "shipperName": 42 })).is_err());
    }

    #[test]
    fn rejects_malformed_line_items() {
        let s = schema();
        assert!(s.shape().check(&json!({ "lineItems": { "quantity": 1 } })).is_err());
        assert!(s.shape().check(&json!({ "lineItems": [{ "quantity": "lots" }] })).is_err());
        assert!(s.shape().check(&json!({ "lineItems": [{ "weight": 1 }] })).is_err());
    }

    #[test]
    fn violation_paths_point_into_candidate() {
        let s = schema();
        let err = s
            .shape()
            .check(&json!({ "lineItems": [{ "quantity": 1 }, { "quantity": "x" }] }))
            .unwrap_err();
        let ShapeError::Rejected { violations, .. } = err else {
            panic!("expected rejection");
        };
        assert!(violations
            .violations()
            .iter()
            .any(|v| v.instance_path.starts_with("/lineItems/1")));
    }

    #[test]
    fn rejects_non_object() {
        let s = schema();
        assert!(matches!(
            s.shape().check(&json!([1, 2])),
            Err(ShapeError::NotAnObject { .. })
        ));
    }

    #[test]
    fn derived_schema_carries_id() {
        let s = schema();
        assert_eq!(s.shape().schema()["$id"], "urn:lfp:form:bill_of_lading");
    }
}
