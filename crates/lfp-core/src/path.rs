//! # Field Paths
//!
//! A `FieldPath` addresses a scalar field or a line-item sub-field by
//! identity. Paths order totally so they can key a `BTreeMap`, which keeps
//! validation reports deterministic.

use serde::{Deserialize, Serialize};

use crate::identity::LineItemId;

/// Stable address of a value inside a form document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum FieldPath {
    /// A top-level scalar field, or a whole repeating group.
    Field { name: String },
    /// A sub-field of one line item.
    Item {
        group: String,
        item: LineItemId,
        field: String,
    },
}

impl FieldPath {
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field { name: name.into() }
    }

    pub fn item(group: impl Into<String>, item: LineItemId, field: impl Into<String>) -> Self {
        Self::Item {
            group: group.into(),
            item,
            field: field.into(),
        }
    }

    /// The line item this path points into, if any.
    pub fn line_item(&self) -> Option<LineItemId> {
        match self {
            Self::Field { .. } => None,
            Self::Item { item, .. } => Some(*item),
        }
    }

    /// The leaf field name.
    pub fn leaf(&self) -> &str {
        match self {
            Self::Field { name } => name,
            Self::Item { field, .. } => field,
        }
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field { name } => f.write_str(name),
            Self::Item { group, item, field } => write!(f, "{group}[{}].{field}", item.0),
        }
    }
}
