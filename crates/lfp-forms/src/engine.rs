//! # Form Engine
//!
//! [`FormEngine`] owns one form instance: its schema, its document, the
//! live per-field markers, and a generation counter.
//!
//! ## Mutation
//!
//! The document changes only through the methods here. Single-value edits
//! (`set_field`, `set_item_field`) never fail on bad input: the value is
//! stored and the field's marker (plus the markers of fields it governs)
//! is recomputed. Only structural mistakes such as an unknown field name
//! return `Err`.
//!
//! Bulk changes (`replace_all`, `reset`, and accepted autofill results) go
//! through one path that builds the complete next document first and swaps
//! it in only if every check passed.
//!
//! ## Generation
//!
//! Every successful mutation and every autofill request increments the
//! generation. An autofill result is applied only if the generation has
//! not moved since its request was issued (see `autofill.rs`).

use std::collections::BTreeMap;
use std::sync::Arc;

use lfp_core::{FieldPath, FieldValue, FormInstanceId, FormType, LfpError, LineItemId};
use lfp_schema::{FieldSpec, FormSchema, GroupSpec, ShapeError};
use serde::Serialize;
use serde_json::Value;

use crate::document::{item_defaults, FormDocument, LineItem, LineItems};
use crate::error::ReplaceError;

static EMPTY: FieldValue = FieldValue::Empty;

/// Result of a full validation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub valid: bool,
    /// One message per failing field, keyed by identity-based path.
    pub errors: BTreeMap<FieldPath, String>,
}

impl ValidationReport {
    fn from_errors(errors: BTreeMap<FieldPath, String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn error_at(&self, path: &FieldPath) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.valid {
            return f.write_str("valid");
        }
        writeln!(f, "{} field(s) invalid:", self.errors.len())?;
        for (path, message) in &self.errors {
            writeln!(f, "  - {path}: {message}")?;
        }
        Ok(())
    }
}

/// A document that passed validation and is ready for submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedForm {
    pub instance: FormInstanceId,
    pub form_type: FormType,
    pub document: Value,
}

/// One mounted form instance.
#[derive(Debug)]
pub struct FormEngine {
    id: FormInstanceId,
    schema: Arc<FormSchema>,
    document: FormDocument,
    markers: BTreeMap<FieldPath, String>,
    generation: u64,
}

impl FormEngine {
    /// Mount a new instance holding the schema defaults.
    pub fn new(schema: Arc<FormSchema>) -> Self {
        let document = FormDocument::defaults(&schema);
        let id = FormInstanceId::new();
        tracing::debug!(form = %id, form_type = %schema.form_type(), "form instance mounted");
        Self {
            id,
            schema,
            document,
            markers: BTreeMap::new(),
            generation: 0,
        }
    }

    pub fn id(&self) -> FormInstanceId {
        self.id
    }

    pub fn schema(&self) -> &Arc<FormSchema> {
        &self.schema
    }

    pub fn form_type(&self) -> &FormType {
        self.schema.form_type()
    }

    pub fn document(&self) -> &FormDocument {
        &self.document
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Live markers for fields edited since mount or last reset.
    pub fn field_errors(&self) -> &BTreeMap<FieldPath, String> {
        &self.markers
    }

    pub fn field_error(&self, path: &FieldPath) -> Option<&str> {
        self.markers.get(path).map(String::as_str)
    }

    /// Line-item ids of `group` in display order.
    pub fn line_item_ids(&self, group: &str) -> Vec<LineItemId> {
        self.document
            .group(group)
            .map(|items| items.ids().to_vec())
            .unwrap_or_default()
    }

    // ── Single-value edits ──────────────────────────────────────────

    /// Store a scalar field value and refresh its marker and the markers
    /// of any fields it governs.
    ///
    /// # Errors
    ///
    /// `LfpError::UnknownField` if the schema declares no such scalar.
    pub fn set_field(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), LfpError> {
        if self.schema.field(name).is_none() {
            return Err(self.unknown_field(name.to_string()));
        }
        self.document.set_field(name, value.into());
        self.refresh_scalar(name);
        self.bump();
        Ok(())
    }

    /// Store a line-item sub-field value and refresh the markers of that
    /// sub-field and its dependents within the same item.
    ///
    /// # Errors
    ///
    /// `UnknownGroup`, `UnknownLineItem`, or `UnknownField` when the
    /// address does not exist.
    pub fn set_item_field(
        &mut self,
        group: &str,
        item: LineItemId,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), LfpError> {
        let schema = Arc::clone(&self.schema);
        let spec = self.group_spec(&schema, group)?;
        if spec.field_spec(name).is_none() {
            return Err(self.unknown_field(format!("{group}.{name}")));
        }
        let row = self
            .document
            .group_mut(group)
            .and_then(|items| items.get_mut(item))
            .ok_or_else(|| LfpError::UnknownLineItem {
                group: group.to_string(),
                item: item.to_string(),
            })?;
        row.set(name, value.into());
        self.refresh_item(spec, item, name);
        self.bump();
        Ok(())
    }

    // ── Line items ──────────────────────────────────────────────────

    /// Append an item to `group` with the declared sub-field defaults,
    /// overridden by `defaults`. Returns the new item's identity.
    ///
    /// # Errors
    ///
    /// `UnknownGroup` or `UnknownField` for names the schema does not
    /// declare. Nothing is appended on error.
    pub fn append_line_item<I, K>(&mut self, group: &str, defaults: I) -> Result<LineItemId, LfpError>
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        let schema = Arc::clone(&self.schema);
        let spec = self.group_spec(&schema, group)?;
        let mut values = item_defaults(spec);
        for (key, value) in defaults {
            let key = key.into();
            if spec.field_spec(&key).is_none() {
                return Err(self.unknown_field(format!("{group}.{key}")));
            }
            values.insert(key, value);
        }

        let id = match self.document.group_mut(group) {
            Some(items) => items.push(values),
            None => return Err(self.unknown_group(group)),
        };
        self.refresh_group_count(spec);
        self.bump();
        Ok(id)
    }

    /// Append an item holding only the declared defaults.
    pub fn append_default_item(&mut self, group: &str) -> Result<LineItemId, LfpError> {
        self.append_line_item(group, std::iter::empty::<(String, FieldValue)>())
    }

    /// Remove the item with `id` from `group`. Returns `false` (and changes
    /// nothing) if there is no such item.
    pub fn remove_line_item(&mut self, group: &str, id: LineItemId) -> bool {
        let removed = self
            .document
            .group_mut(group)
            .and_then(|items| items.remove(id))
            .is_some();
        if !removed {
            return false;
        }
        self.markers.retain(|path, _| path.line_item() != Some(id));
        let schema = Arc::clone(&self.schema);
        if let Some(spec) = schema.group(group) {
            self.refresh_group_count(spec);
        }
        self.bump();
        true
    }

    // ── Validation ──────────────────────────────────────────────────

    /// Run every rule against the current document. Pure.
    pub fn validate(&self) -> ValidationReport {
        let mut errors = BTreeMap::new();

        for spec in self.schema.fields() {
            if let Some(message) = self.check_scalar(spec) {
                errors.insert(FieldPath::field(&spec.name), message);
            }
        }

        for group in self.schema.groups() {
            if let Some(message) = self.check_group_count(group) {
                errors.insert(FieldPath::field(&group.name), message);
            }
            let Some(items) = self.document.group(&group.name) else {
                continue;
            };
            for item in items.iter() {
                for spec in &group.fields {
                    if let Some(message) = check_item_field(spec, item) {
                        errors.insert(FieldPath::item(&group.name, item.id(), &spec.name), message);
                    }
                }
            }
        }

        ValidationReport::from_errors(errors)
    }

    /// Validate and, if everything passes, produce the submission payload.
    ///
    /// # Errors
    ///
    /// The failing report, including too-few-line-items errors.
    pub fn finalize(&self) -> Result<FinalizedForm, ValidationReport> {
        let report = self.validate();
        if !report.valid {
            tracing::info!(
                form = %self.id,
                errors = report.errors.len(),
                "finalize refused: document invalid"
            );
            return Err(report);
        }
        Ok(FinalizedForm {
            instance: self.id,
            form_type: self.schema.form_type().clone(),
            document: self.document.to_json(),
        })
    }

    // ── Bulk replacement ────────────────────────────────────────────

    /// Substitute the whole document. Keys the candidate omits take their
    /// schema defaults.
    ///
    /// # Errors
    ///
    /// `ReplaceError` if the candidate fails the shape check or cannot be
    /// converted; the current document is untouched.
    pub fn replace_all(&mut self, candidate: &Value) -> Result<(), ReplaceError> {
        let base = FormDocument::defaults(&self.schema);
        match self.admit(&base, candidate) {
            Ok(next) => {
                self.install(next);
                tracing::info!(form = %self.id, generation = self.generation, "document replaced");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(form = %self.id, error = %e, "document replacement rejected");
                Err(e)
            }
        }
    }

    /// Restore the schema defaults and clear all markers.
    pub fn reset(&mut self) {
        self.document = FormDocument::defaults(&self.schema);
        self.markers.clear();
        self.bump();
        tracing::debug!(form = %self.id, "document reset");
    }

    /// Check `candidate` and build the document it would produce when laid
    /// over `base`. Does not touch `self`.
    pub(crate) fn admit(&self, base: &FormDocument, candidate: &Value) -> Result<FormDocument, ReplaceError> {
        self.schema.shape().check(candidate)?;
        let Some(map) = candidate.as_object() else {
            return Err(ShapeError::NotAnObject {
                form_type: self.schema.form_type().to_string(),
            }
            .into());
        };
        Ok(base.overlay(&self.schema, map)?)
    }

    /// Swap in an admitted document and recompute every marker.
    pub(crate) fn install(&mut self, next: FormDocument) {
        self.document = next;
        self.markers = self.validate().errors;
        self.bump();
    }

    pub(crate) fn bump(&mut self) {
        self.generation += 1;
    }

    // ── Internals ───────────────────────────────────────────────────

    fn check_scalar(&self, spec: &FieldSpec) -> Option<String> {
        let value = self.document.field(&spec.name).unwrap_or(&EMPTY);
        let governing_on = spec
            .required_when
            .as_deref()
            .is_some_and(|g| self.document.flag(g));
        spec.check(value, governing_on)
            .map(|violation| format!("{} {violation}", spec.display_label()))
    }

    fn check_group_count(&self, group: &GroupSpec) -> Option<String> {
        let count = self.document.group(&group.name).map_or(0, LineItems::len);
        (count < group.min_items).then(|| {
            let label = if group.label.is_empty() { &group.name } else { &group.label };
            format!("{label} needs at least {} item(s)", group.min_items)
        })
    }

    fn refresh_scalar(&mut self, name: &str) {
        let schema = Arc::clone(&self.schema);
        for spec in affected(schema.fields(), name) {
            let message = self.check_scalar(spec);
            self.set_marker(FieldPath::field(&spec.name), message);
        }
    }

    fn refresh_item(&mut self, group: &GroupSpec, id: LineItemId, name: &str) {
        for spec in affected(&group.fields, name) {
            let message = self
                .document
                .group(&group.name)
                .and_then(|items| items.get(id))
                .and_then(|item| check_item_field(spec, item));
            self.set_marker(FieldPath::item(&group.name, id, &spec.name), message);
        }
    }

    fn refresh_group_count(&mut self, group: &GroupSpec) {
        let message = self.check_group_count(group);
        self.set_marker(FieldPath::field(&group.name), message);
    }

    fn set_marker(&mut self, path: FieldPath, message: Option<String>) {
        match message {
            Some(m) => {
                self.markers.insert(path, m);
            }
            None => {
                self.markers.remove(&path);
            }
        }
    }

    fn group_spec<'s>(&self, schema: &'s FormSchema, group: &str) -> Result<&'s GroupSpec, LfpError> {
        schema.group(group).ok_or_else(|| self.unknown_group(group))
    }

    fn unknown_field(&self, name: String) -> LfpError {
        LfpError::UnknownField {
            form_type: self.schema.form_type().to_string(),
            name,
        }
    }

    fn unknown_group(&self, group: &str) -> LfpError {
        LfpError::UnknownGroup {
            form_type: self.schema.form_type().to_string(),
            group: group.to_string(),
        }
    }
}

/// `name` itself plus every field in the same scope it governs.
fn affected<'a>(fields: &'a [FieldSpec], name: &'a str) -> impl Iterator<Item = &'a FieldSpec> + 'a {
    fields
        .iter()
        .filter(move |spec| spec.name == name || spec.required_when.as_deref() == Some(name))
}

fn check_item_field(spec: &FieldSpec, item: &LineItem) -> Option<String> {
    let value = item.get(&spec.name).unwrap_or(&EMPTY);
    let governing_on = spec
        .required_when
        .as_deref()
        .and_then(|g| item.get(g))
        .and_then(FieldValue::as_bool)
        .unwrap_or(false);
    spec.check(value, governing_on)
        .map(|violation| format!("{} {violation}", spec.display_label()))
}
