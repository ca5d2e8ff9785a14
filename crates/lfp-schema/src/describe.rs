//! # Simplified Schema Description
//!
//! The completion service is told which keys it may fill and what kind of
//! value each takes. The description is built from the declared
//! `FieldKind → HintKind` table once, when the schema is constructed.
//!
//! Signature fields are omitted: they are only ever captured from the
//! drawing surface.
//!
//! Text form, one line per key:
//!
//! ```text
//! form: Bill of Lading (bill_of_lading)
//! shipperName: string (required)
//! shipDate: date
//! lineItems[]: { quantity: number (required), isHazmat: boolean, unNumber: string (required if isHazmat) }
//! ```

use lfp_core::{FormType, HintKind};
use serde::Serialize;

use crate::form::{FieldSpec, SchemaDefinition};

/// Hint for one autofillable field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldHint {
    pub name: String,
    pub hint: HintKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_when: Option<String>,
}

/// Hints for one repeating group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupHint {
    pub name: String,
    pub fields: Vec<FieldHint>,
}

/// Structured counterpart of the text description.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaHints {
    pub form_type: FormType,
    pub fields: Vec<FieldHint>,
    pub groups: Vec<GroupHint>,
}

impl SchemaHints {
    pub(crate) fn from_definition(definition: &SchemaDefinition) -> Self {
        Self {
            form_type: definition.form_type.clone(),
            fields: hints_for(&definition.fields),
            groups: definition
                .groups
                .iter()
                .map(|g| GroupHint {
                    name: g.name.clone(),
                    fields: hints_for(&g.fields),
                })
                .collect(),
        }
    }
}

fn hints_for(fields: &[FieldSpec]) -> Vec<FieldHint> {
    fields
        .iter()
        .filter(|f| f.kind.autofillable())
        .map(|f| FieldHint {
            name: f.name.clone(),
            hint: f.kind.hint(),
            required: f.required,
            required_when: f.required_when.clone(),
        })
        .collect()
}

fn render_hint(hint: &FieldHint) -> String {
    let mut line = format!("{}: {}", hint.name, hint.hint);
    if hint.required {
        line.push_str(" (required)");
    } else if let Some(governing) = &hint.required_when {
        line.push_str(&format!(" (required if {governing})"));
    }
    line
}

pub(crate) fn render(definition: &SchemaDefinition) -> String {
    let hints = SchemaHints::from_definition(definition);
    let mut lines = vec![format!("form: {} ({})", definition.title, definition.form_type)];
    lines.extend(hints.fields.iter().map(render_hint));
    for group in &hints.groups {
        let inner: Vec<String> = group.fields.iter().map(render_hint).collect();
        lines.push(format!("{}[]: {{ {} }}", group.name, inner.join(", ")));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use crate::form::{FieldSpec, FormSchema, GroupSpec};

    #[test]
    fn renders_fields_and_groups() {
        let schema = FormSchema::builder("bill_of_lading", "Bill of Lading")
            .field(FieldSpec::text("shipperName").required())
            .field(FieldSpec::date("shipDate"))
            .field(FieldSpec::signature("shipperSignature").required())
            .group(
                GroupSpec::new("lineItems")
                    .field(FieldSpec::number("quantity").required())
                    .field(FieldSpec::boolean("isHazmat"))
                    .field(FieldSpec::text("unNumber").required_when("isHazmat")),
            )
            .build()
            .unwrap();

        let expected = "form: Bill of Lading (bill_of_lading)\n\
                        shipperName: string (required)\n\
                        shipDate: date\n\
                        lineItems[]: { quantity: number (required), isHazmat: boolean, unNumber: string (required if isHazmat) }";
        assert_eq!(schema.description(), expected);
    }

    #[test]
    fn hints_skip_signatures() {
        let schema = FormSchema::builder("sig_form", "Sig")
            .field(FieldSpec::signature("driverSignature"))
            .field(FieldSpec::number("odometer"))
            .build()
            .unwrap();
        let hints = schema.hints();
        assert_eq!(hints.fields.len(), 1);
        assert_eq!(hints.fields[0].name, "odometer");
        let json = serde_json::to_value(hints).unwrap();
        assert_eq!(json["formType"], "sig_form");
        assert_eq!(json["fields"][0]["hint"], "number");
    }
}
