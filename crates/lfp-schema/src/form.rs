//! # Form Schema Model
//!
//! A form has scalar fields and zero or more repeating groups. Each group
//! holds line items whose sub-fields are declared like scalar fields.
//!
//! ```text
//! FormSchema
//!   ├─ fields:  shipperName, consigneeName, shipDate, shipperSignature, ...
//!   └─ groups:
//!        └─ lineItems (min 1)
//!             ├─ quantity     number, required, min 1
//!             ├─ isHazmat     boolean
//!             └─ unNumber     text, required when isHazmat
//! ```
//!
//! Conditional requirements (`required_when`) are scoped: a scalar field
//! may only be governed by another scalar field, and a line-item sub-field
//! only by a sibling in the same line item.

use std::collections::HashSet;

use lfp_core::{FieldKind, FieldValue, FormType};
use serde::{Deserialize, Serialize};

use crate::describe::{self, SchemaHints};
use crate::error::SchemaError;
use crate::shape::ShapeValidator;

/// Declaration of one field (scalar or line-item sub-field).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Name of a boolean field in the same scope; while it is `true` this
    /// field is required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldValue>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: String::new(),
            kind,
            required: false,
            min: None,
            required_when: None,
            default: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Date)
    }

    pub fn signature(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Signature)
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn required_when(mut self, governing: impl Into<String>) -> Self {
        self.required_when = Some(governing.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// The label shown to users, falling back to the field name.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }

    /// The value a freshly created field holds.
    pub fn initial_value(&self) -> FieldValue {
        self.default.clone().unwrap_or_default()
    }
}

fn default_initial_items() -> usize {
    1
}

/// Declaration of a repeating group of line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub name: String,
    #[serde(default)]
    pub label: String,
    pub fields: Vec<FieldSpec>,
    /// Finalisation is refused with fewer items than this.
    #[serde(default)]
    pub min_items: usize,
    /// Empty items created when a form instance is mounted.
    #[serde(default = "default_initial_items")]
    pub initial_items: usize,
}

impl GroupSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: String::new(),
            fields: Vec::new(),
            min_items: 0,
            initial_items: 1,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn min_items(mut self, n: usize) -> Self {
        self.min_items = n;
        self
    }

    pub fn initial_items(mut self, n: usize) -> Self {
        self.initial_items = n;
        self
    }

    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// The serializable part of a schema, as authored in YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub form_type: FormType,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
}

/// A checked form schema with its derived shape validator and description.
#[derive(Debug)]
pub struct FormSchema {
    definition: SchemaDefinition,
    shape: ShapeValidator,
    description: String,
    hints: SchemaHints,
}

impl FormSchema {
    pub fn builder(form_type: impl Into<String>, title: impl Into<String>) -> FormSchemaBuilder {
        FormSchemaBuilder {
            form_type: form_type.into(),
            title: title.into(),
            category: String::new(),
            fields: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Check a definition and derive its shape validator and description.
    ///
    /// # Errors
    ///
    /// Returns a `SchemaError` naming the first integrity problem found.
    pub fn from_definition(definition: SchemaDefinition) -> Result<Self, SchemaError> {
        check_scope("form", &definition.fields)?;

        let mut top_names: HashSet<&str> = definition.fields.iter().map(|f| f.name.as_str()).collect();
        for group in &definition.groups {
            if !top_names.insert(group.name.as_str()) {
                return Err(SchemaError::DuplicateName {
                    scope: "form".to_string(),
                    name: group.name.clone(),
                });
            }
            check_scope(&group.name, &group.fields)?;
            if group.initial_items < group.min_items {
                return Err(SchemaError::InitialItemsBelowMinimum {
                    group: group.name.clone(),
                    initial: group.initial_items,
                    min: group.min_items,
                });
            }
        }

        let shape = ShapeValidator::for_definition(&definition)?;
        let hints = SchemaHints::from_definition(&definition);
        let description = describe::render(&definition);

        tracing::debug!(form_type = %definition.form_type, "form schema built");

        Ok(Self {
            definition,
            shape,
            description,
            hints,
        })
    }

    /// Parse and check a YAML schema definition.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Yaml` if the source does not parse, or any
    /// integrity error from [`FormSchema::from_definition`].
    pub fn from_yaml(source_name: &str, yaml: &str) -> Result<Self, SchemaError> {
        let definition: SchemaDefinition =
            serde_yaml::from_str(yaml).map_err(|e| SchemaError::Yaml {
                source_name: source_name.to_string(),
                reason: e.to_string(),
            })?;
        Self::from_definition(definition)
    }

    pub fn form_type(&self) -> &FormType {
        &self.definition.form_type
    }

    pub fn title(&self) -> &str {
        &self.definition.title
    }

    pub fn category(&self) -> &str {
        &self.definition.category
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.definition.fields
    }

    pub fn groups(&self) -> &[GroupSpec] {
        &self.definition.groups
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.definition.fields.iter().find(|f| f.name == name)
    }

    pub fn group(&self, name: &str) -> Option<&GroupSpec> {
        self.definition.groups.iter().find(|g| g.name == name)
    }

    pub fn definition(&self) -> &SchemaDefinition {
        &self.definition
    }

    /// Compiled validator for whole-document candidates.
    pub fn shape(&self) -> &ShapeValidator {
        &self.shape
    }

    /// Simplified, line-oriented description for the completion service.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Structured form of [`FormSchema::description`].
    pub fn hints(&self) -> &SchemaHints {
        &self.hints
    }
}

/// Incremental construction of a [`FormSchema`] in code.
#[derive(Debug, Clone)]
pub struct FormSchemaBuilder {
    form_type: String,
    title: String,
    category: String,
    fields: Vec<FieldSpec>,
    groups: Vec<GroupSpec>,
}

impl FormSchemaBuilder {
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn group(mut self, group: GroupSpec) -> Self {
        self.groups.push(group);
        self
    }

    pub fn build(self) -> Result<FormSchema, SchemaError> {
        FormSchema::from_definition(SchemaDefinition {
            form_type: FormType::new(self.form_type)?,
            title: self.title,
            category: self.category,
            fields: self.fields,
            groups: self.groups,
        })
    }
}

fn check_scope(scope: &str, fields: &[FieldSpec]) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for spec in fields {
        if !seen.insert(spec.name.as_str()) {
            return Err(SchemaError::DuplicateName {
                scope: scope.to_string(),
                name: spec.name.clone(),
            });
        }
    }

    for spec in fields {
        if let Some(governing) = &spec.required_when {
            match fields.iter().find(|f| &f.name == governing) {
                None => {
                    return Err(SchemaError::UnknownGoverningField {
                        scope: scope.to_string(),
                        field: spec.name.clone(),
                        governing: governing.clone(),
                    })
                }
                Some(g) if g.kind != FieldKind::Boolean => {
                    return Err(SchemaError::GoverningFieldNotBoolean {
                        field: spec.name.clone(),
                        governing: governing.clone(),
                    })
                }
                Some(_) => {}
            }
        }

        if spec.min.is_some() && spec.kind != FieldKind::Number {
            return Err(SchemaError::MinimumOnNonNumber {
                field: spec.name.clone(),
            });
        }

        if let Some(default) = &spec.default {
            let compatible = match (spec.kind, default) {
                (_, FieldValue::Empty) => true,
                (FieldKind::Number, FieldValue::Number(_)) => true,
                (FieldKind::Boolean, FieldValue::Bool(_)) => true,
                (FieldKind::Text | FieldKind::Date | FieldKind::Signature, FieldValue::Text(_)) => {
                    true
                }
                _ => false,
            };
            if !compatible {
                return Err(SchemaError::DefaultKindMismatch {
                    field: spec.name.clone(),
                    kind: format!("{:?}", spec.kind).to_lowercase(),
                });
            }
        }
    }
    Ok(())
}
