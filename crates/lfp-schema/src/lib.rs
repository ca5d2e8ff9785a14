//! # lfp-schema: Form Schemas
//!
//! Declarative schemas for the structured forms in the portal catalog
//! (bills of lading, driver logs, inspection reports, ...).
//!
//! ## Authoring (`form`)
//!
//! A [`FormSchema`] is built either with [`FormSchema::builder`] or from a
//! YAML definition via [`FormSchema::from_yaml`]. Construction checks the
//! schema's integrity (unique names, governing fields that exist and are
//! boolean, kind-compatible defaults) and derives, once, everything that
//! depends only on the schema:
//!
//! - the compiled JSON Schema used for shape validation (`shape`)
//! - the simplified description sent to the completion service (`describe`)
//!
//! ## Rules (`rules`)
//!
//! Field-level rules (required, numeric coercion, minimums, dates,
//! conditional requirement) are pure functions of a value and the state of
//! its governing flag.
//!
//! ## Catalog (`catalog`)
//!
//! The built-in form schemas ship as YAML in `catalog/` and are loaded by
//! [`FormCatalog::builtin`].
//!
//! ## Crate Policy
//!
//! - Depends only on `lfp-core` internally.
//! - Shape validation is a trust boundary: rejected documents carry
//!   structured violations with instance path and schema path.

pub mod catalog;
pub mod describe;
pub mod error;
pub mod form;
pub mod rules;
pub mod shape;

pub use catalog::FormCatalog;
pub use describe::{FieldHint, GroupHint, SchemaHints};
pub use error::SchemaError;
pub use form::{FieldSpec, FormSchema, FormSchemaBuilder, GroupSpec, SchemaDefinition};
pub use rules::{coerce_number, RuleViolation};
pub use shape::{ShapeError, ShapeValidator, ValidationViolations, Violation};
