//! # Built-in Form Catalog
//!
//! The schemas bundled with the portal. Each ships as a YAML file under
//! `catalog/` and is compiled into the binary; `FormCatalog::builtin`
//! parses and checks all of them.
//!
//! The catalog is data only. Which page renders which form is the host's
//! business.

use std::collections::BTreeMap;
use std::sync::Arc;

use lfp_core::FormType;

use crate::error::SchemaError;
use crate::form::FormSchema;

const BUILTIN_SOURCES: &[(&str, &str)] = &[
    ("bill_of_lading.yaml", include_str!("../catalog/bill_of_lading.yaml")),
    ("driver_daily_log.yaml", include_str!("../catalog/driver_daily_log.yaml")),
    ("vehicle_inspection.yaml", include_str!("../catalog/vehicle_inspection.yaml")),
    ("accident_report.yaml", include_str!("../catalog/accident_report.yaml")),
];

/// Form schemas indexed by form type.
#[derive(Debug, Clone, Default)]
pub struct FormCatalog {
    schemas: BTreeMap<FormType, Arc<FormSchema>>,
}

impl FormCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every bundled schema.
    ///
    /// # Errors
    ///
    /// Returns the first `SchemaError` encountered; a bundled schema that
    /// fails to load is a build defect.
    pub fn builtin() -> Result<Self, SchemaError> {
        let mut catalog = Self::new();
        for (name, source) in BUILTIN_SOURCES {
            catalog.insert(FormSchema::from_yaml(name, source)?);
        }
        tracing::debug!(count = catalog.len(), "loaded built-in form catalog");
        Ok(catalog)
    }

    /// Register a schema, replacing any previous schema of the same type.
    pub fn insert(&mut self, schema: FormSchema) -> Arc<FormSchema> {
        let schema = Arc::new(schema);
        self.schemas.insert(schema.form_type().clone(), Arc::clone(&schema));
        schema
    }

    pub fn get(&self, form_type: &FormType) -> Option<Arc<FormSchema>> {
        self.schemas.get(form_type).cloned()
    }

    /// Look up by raw identifier; malformed identifiers simply miss.
    pub fn get_str(&self, form_type: &str) -> Option<Arc<FormSchema>> {
        FormType::new(form_type).ok().and_then(|ft| self.get(&ft))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// All form types, sorted.
    pub fn form_types(&self) -> Vec<&FormType> {
        self.schemas.keys().collect()
    }

    /// Schemas in one category, sorted by form type.
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Arc<FormSchema>> + 'a {
        self.schemas.values().filter(move |s| s.category() == category)
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<&str> {
        let mut cats: Vec<&str> = self.schemas.values().map(|s| s.category()).collect();
        cats.sort_unstable();
        cats.dedup();
        cats
    }
}
