//! # Form Documents
//!
//! The data held by one form instance: scalar fields plus, for each
//! repeating group, an ordered collection of line items.
//!
//! ## Line-item arena
//!
//! [`LineItems`] stores items in a map keyed by [`LineItemId`] and keeps
//! display order in a separate id list. Removing an item deletes its slot
//! and its id from the order list; every other item keeps its identity and
//! relative position, so bound UI state and error paths stay valid.

use std::collections::{BTreeMap, HashMap};

use lfp_core::{FieldValue, LfpError, LineItemId};
use lfp_schema::{FieldSpec, FormSchema, GroupSpec};
use serde_json::{Map, Value};

/// One row of a repeating group.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    id: LineItemId,
    values: BTreeMap<String, FieldValue>,
}

impl LineItem {
    fn new(values: BTreeMap<String, FieldValue>) -> Self {
        Self {
            id: LineItemId::new(),
            values,
        }
    }

    pub fn id(&self) -> LineItemId {
        self.id
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn values(&self) -> &BTreeMap<String, FieldValue> {
        &self.values
    }

    pub(crate) fn set(&mut self, field: &str, value: FieldValue) {
        self.values.insert(field.to_string(), value);
    }

    /// Sub-field values as a JSON object, without the identity.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

/// Ordered, identity-addressed line items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItems {
    slots: HashMap<LineItemId, LineItem>,
    order: Vec<LineItemId>,
}

impl LineItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Append a new item with a fresh identity.
    pub fn push(&mut self, values: BTreeMap<String, FieldValue>) -> LineItemId {
        let item = LineItem::new(values);
        let id = item.id;
        self.order.push(id);
        self.slots.insert(id, item);
        id
    }

    /// Remove the item with `id`, returning it. Order of the rest is kept.
    pub fn remove(&mut self, id: LineItemId) -> Option<LineItem> {
        let item = self.slots.remove(&id)?;
        self.order.retain(|existing| *existing != id);
        Some(item)
    }

    pub fn get(&self, id: LineItemId) -> Option<&LineItem> {
        self.slots.get(&id)
    }

    pub fn get_mut(&mut self, id: LineItemId) -> Option<&mut LineItem> {
        self.slots.get_mut(&id)
    }

    pub fn contains(&self, id: LineItemId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Identities in display order.
    pub fn ids(&self) -> &[LineItemId] {
        &self.order
    }

    /// Current display position of `id`.
    pub fn position(&self, id: LineItemId) -> Option<usize> {
        self.order.iter().position(|existing| *existing == id)
    }

    /// Items in display order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> + '_ {
        self.order.iter().filter_map(|id| self.slots.get(id))
    }

    /// Items as a JSON array in display order.
    pub fn to_json(&self) -> Value {
        Value::Array(self.iter().map(LineItem::to_json).collect())
    }
}

/// The full contents of one form instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormDocument {
    fields: BTreeMap<String, FieldValue>,
    groups: BTreeMap<String, LineItems>,
}

impl FormDocument {
    /// A document holding every declared default, with `initial_items`
    /// default line items per group.
    pub fn defaults(schema: &FormSchema) -> Self {
        let fields = schema
            .fields()
            .iter()
            .map(|spec| (spec.name.clone(), spec.initial_value()))
            .collect();

        let groups = schema
            .groups()
            .iter()
            .map(|group| {
                let mut items = LineItems::new();
                for _ in 0..group.initial_items {
                    items.push(item_defaults(group));
                }
                (group.name.clone(), items)
            })
            .collect();

        Self { fields, groups }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn group(&self, name: &str) -> Option<&LineItems> {
        self.groups.get(name)
    }

    pub fn groups(&self) -> &BTreeMap<String, LineItems> {
        &self.groups
    }

    pub(crate) fn set_field(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }

    pub(crate) fn group_mut(&mut self, name: &str) -> Option<&mut LineItems> {
        self.groups.get_mut(name)
    }

    /// Whether the boolean field `name` currently reads as `true`.
    pub fn flag(&self, name: &str) -> bool {
        self.fields
            .get(name)
            .and_then(FieldValue::as_bool)
            .unwrap_or(false)
    }

    /// Flat JSON snapshot: scalar keys plus one array per group, items in
    /// display order, no identities.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (name, value) in &self.fields {
            map.insert(name.clone(), value.to_json());
        }
        for (name, items) in &self.groups {
            map.insert(name.clone(), items.to_json());
        }
        Value::Object(map)
    }

    /// Lay a candidate object over `self`, producing a new document.
    ///
    /// Keys present in the candidate replace the current value. Keys
    /// absent keep it. A group present in the candidate replaces that
    /// group's items wholesale; sub-fields an item omits take their
    /// declared defaults. Every replacement item gets a fresh identity.
    ///
    /// # Errors
    ///
    /// Any key that is not a declared field or group, a group that is not
    /// an array of objects, or a value with no scalar form rejects the
    /// whole candidate.
    pub fn overlay(&self, schema: &FormSchema, candidate: &Map<String, Value>) -> Result<Self, LfpError> {
        let mut next = self.clone();
        for (key, raw) in candidate {
            if schema.field(key).is_some() {
                next.fields.insert(key.clone(), FieldValue::from_json(raw)?);
            } else if let Some(group) = schema.group(key) {
                next.groups.insert(key.clone(), items_from_json(schema, group, raw)?);
            } else {
                return Err(LfpError::UnknownField {
                    form_type: schema.form_type().to_string(),
                    name: key.clone(),
                });
            }
        }
        Ok(next)
    }
}

/// Initial sub-field values for a new item of `group`.
pub(crate) fn item_defaults(group: &GroupSpec) -> BTreeMap<String, FieldValue> {
    group
        .fields
        .iter()
        .map(|spec: &FieldSpec| (spec.name.clone(), spec.initial_value()))
        .collect()
}

fn items_from_json(schema: &FormSchema, group: &GroupSpec, raw: &Value) -> Result<LineItems, LfpError> {
    let Value::Array(rows) = raw else {
        return Err(LfpError::UnrepresentableValue(format!(
            "group '{}' must be an array, got {raw}",
            group.name
        )));
    };

    let mut items = LineItems::new();
    for row in rows {
        let Value::Object(cells) = row else {
            return Err(LfpError::UnrepresentableValue(format!(
                "item of group '{}' must be an object, got {row}",
                group.name
            )));
        };
        let mut values = item_defaults(group);
        for (key, cell) in cells {
            if group.field_spec(key).is_none() {
                return Err(LfpError::UnknownField {
                    form_type: schema.form_type().to_string(),
                    name: format!("{}.{key}", group.name),
                });
            }
            values.insert(key.clone(), FieldValue::from_json(cell)?);
        }
        items.push(values);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lfp_schema::FieldSpec;
    use serde_json::json;

    fn schema() -> FormSchema {
        FormSchema::builder("pickup_sheet", "Pickup Sheet")
            .field(FieldSpec::text("driver"))
            .field(FieldSpec::boolean("urgent").default_value(false))
            .group(
                GroupSpec::new("stops")
                    .field(FieldSpec::text("city").default_value(""))
                    .field(FieldSpec::number("pallets").default_value(0.0)),
            )
            .build()
            .unwrap()
    }

    // ── LineItems ───────────────────────────────────────────────────

    #[test]
    fn remove_keeps_relative_order() {
        let mut items = LineItems::new();
        let a = items.push(BTreeMap::new());
        let b = items.push(BTreeMap::new());
        let c = items.push(BTreeMap::new());
        assert!(items.remove(b).is_some());
        assert_eq!(items.ids(), &[a, c]);
        assert_eq!(items.position(c), Some(1));
    }

    #[test]
    fn remove_unknown_is_none() {
        let mut items = LineItems::new();
        items.push(BTreeMap::new());
        assert!(items.remove(LineItemId::new()).is_none());
        assert_eq!(items.len(), 1);
    }

    // ── FormDocument ────────────────────────────────────────────────

    #[test]
    fn defaults_follow_schema() {
        let doc = FormDocument::defaults(&schema());
        assert_eq!(doc.field("driver"), Some(&FieldValue::Empty));
        assert_eq!(doc.field("urgent"), Some(&FieldValue::Bool(false)));
        let stops = doc.group("stops").unwrap();
        assert_eq!(stops.len(), 1);
        let first = stops.iter().next().unwrap();
        assert_eq!(first.get("pallets"), Some(&FieldValue::Number(0.0)));
    }

    #[test]
    fn to_json_is_flat_without_ids() {
        let doc = FormDocument::defaults(&schema());
        assert_eq!(
            doc.to_json(),
            json!({
                "driver": null,
                "urgent": false,
                "stops": [{ "city": "", "pallets": 0.0 }]
            })
        );
    }

    #[test]
    fn overlay_keeps_absent_keys_and_replaces_groups() {
        let schema = schema();
        let mut doc = FormDocument::defaults(&schema);
        doc.set_field("driver", FieldValue::text("Ana"));
        let candidate = json!({
            "urgent": true,
            "stops": [{ "city": "Dallas" }, { "city": "Tulsa", "pallets": 4 }]
        });

        let next = doc.overlay(&schema, candidate.as_object().unwrap()).unwrap();
        assert_eq!(next.field("driver"), Some(&FieldValue::text("Ana")));
        assert_eq!(next.field("urgent"), Some(&FieldValue::Bool(true)));
        let stops: Vec<_> = next.group("stops").unwrap().iter().collect();
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].get("pallets"), Some(&FieldValue::Number(0.0)));
        assert_eq!(stops[1].get("city"), Some(&FieldValue::text("Tulsa")));
    }

    #[test]
    fn overlay_rejects_unknown_keys() {
        let schema = schema();
        let doc = FormDocument::defaults(&schema);
        let bad = json!({ "driver": "Ana", "mood": "great" });
        assert!(matches!(
            doc.overlay(&schema, bad.as_object().unwrap()),
            Err(LfpError::UnknownField { name, .. }) if name == "mood"
        ));

        let bad_item = json!({ "stops": [{ "zip": "75001" }] });
        assert!(doc.overlay(&schema, bad_item.as_object().unwrap()).is_err());

        let not_array = json!({ "stops": { "city": "Dallas" } });
        assert!(doc.overlay(&schema, not_array.as_object().unwrap()).is_err());
    }
}
