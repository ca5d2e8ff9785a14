//! Errors raised while authoring or loading a form schema.

use thiserror::Error;

/// A schema definition that cannot be turned into a usable `FormSchema`.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The YAML source could not be parsed.
    #[error("invalid schema YAML for '{source_name}': {reason}")]
    Yaml {
        /// File or identifier the YAML came from.
        source_name: String,
        /// Parser message.
        reason: String,
    },

    /// The form-type identifier is malformed.
    #[error(transparent)]
    Identifier(#[from] lfp_core::LfpError),

    /// Two fields (or a field and a group) share a name within one scope.
    #[error("duplicate name '{name}' in scope '{scope}'")]
    DuplicateName {
        /// `form` for top-level names, otherwise the group name.
        scope: String,
        /// The repeated name.
        name: String,
    },

    /// A conditional requirement names a field that does not exist in scope.
    #[error("field '{field}' is required when '{governing}', which is not declared in scope '{scope}'")]
    UnknownGoverningField {
        scope: String,
        field: String,
        governing: String,
    },

    /// A conditional requirement names a field that is not boolean.
    #[error("field '{field}' is governed by '{governing}', which is not a boolean field")]
    GoverningFieldNotBoolean { field: String, governing: String },

    /// A numeric minimum was declared on a non-numeric field.
    #[error("field '{field}' declares a minimum but is not a number field")]
    MinimumOnNonNumber { field: String },

    /// A default value does not match the declared kind.
    #[error("field '{field}' has a default incompatible with kind '{kind}'")]
    DefaultKindMismatch { field: String, kind: String },

    /// A group would be created with fewer rows than it requires.
    #[error("group '{group}' starts with {initial} items but requires at least {min}")]
    InitialItemsBelowMinimum {
        group: String,
        initial: usize,
        min: usize,
    },

    /// The derived JSON Schema could not be compiled.
    #[error("shape validator build error for '{form_type}': {reason}")]
    ShapeBuild { form_type: String, reason: String },
}
