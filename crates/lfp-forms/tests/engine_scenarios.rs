//! End-to-end engine behaviour against the built-in Bill of Lading schema.

use std::sync::Arc;

use lfp_core::{FieldPath, FieldValue, LineItemId};
use lfp_forms::{AutofillError, FormEngine, ReplaceError};
use lfp_schema::{FieldSpec, FormCatalog, FormSchema, GroupSpec};
use proptest::prelude::*;
use serde_json::json;

fn bill_of_lading() -> Arc<FormSchema> {
    FormCatalog::builtin()
        .expect("builtin catalog builds")
        .get_str("bill_of_lading")
        .expect("bill_of_lading is registered")
}

fn item_snapshot(engine: &FormEngine) -> Vec<(LineItemId, serde_json::Value)> {
    engine
        .document()
        .group("lineItems")
        .map(|items| items.iter().map(|i| (i.id(), i.to_json())).collect())
        .unwrap_or_default()
}

// ── Line-item scenarios ─────────────────────────────────────────────

#[test]
fn hazmat_requires_un_number_only_while_flagged() {
    let mut engine = FormEngine::new(bill_of_lading());
    let ids = engine.line_item_ids("lineItems");
    assert_eq!(ids.len(), 1);
    let item1 = ids[0];
    assert_eq!(
        engine.document().group("lineItems").unwrap().get(item1).unwrap().to_json(),
        json!({ "quantity": 1.0, "description": "", "weight": 0.0, "isHazmat": false, "unNumber": null })
    );

    let un_path = FieldPath::item("lineItems", item1, "unNumber");
    assert!(engine.validate().error_at(&un_path).is_none());

    engine.set_item_field("lineItems", item1, "isHazmat", true).unwrap();
    let report = engine.validate();
    assert!(!report.is_valid());
    assert_eq!(report.error_at(&un_path), Some("UN/NA Number is required"));

    engine.set_item_field("lineItems", item1, "unNumber", "UN1203").unwrap();
    assert!(engine.validate().error_at(&un_path).is_none());
    assert!(engine.field_error(&un_path).is_none());
}

#[test]
fn toggling_governing_flag_preserves_governed_value() {
    let mut engine = FormEngine::new(bill_of_lading());
    let item = engine.line_item_ids("lineItems")[0];
    engine.set_item_field("lineItems", item, "isHazmat", true).unwrap();
    engine.set_item_field("lineItems", item, "unNumber", "UN1203").unwrap();

    engine.set_item_field("lineItems", item, "isHazmat", false).unwrap();
    engine.set_item_field("lineItems", item, "isHazmat", true).unwrap();

    let row = engine.document().group("lineItems").unwrap().get(item).unwrap();
    assert_eq!(row.get("unNumber"), Some(&FieldValue::text("UN1203")));
    assert!(engine
        .validate()
        .error_at(&FieldPath::item("lineItems", item, "unNumber"))
        .is_none());
}

#[test]
fn stale_governed_input_is_ignored_once_flag_is_off() {
    let schema = FormSchema::builder("hazmat_shipment", "Hazmat Shipment")
        .field(FieldSpec::text("shipperName"))
        .group(
            GroupSpec::new("lineItems")
                .field(FieldSpec::boolean("isHazmat").default_value(false))
                .field(FieldSpec::number("hazmatPlacards").required_when("isHazmat").min(1.0))
                .field(FieldSpec::date("permitDate").required_when("isHazmat")),
        )
        .build()
        .unwrap();
    let mut engine = FormEngine::new(Arc::new(schema));
    let item = engine.line_item_ids("lineItems")[0];
    let placards = FieldPath::item("lineItems", item, "hazmatPlacards");
    let permit = FieldPath::item("lineItems", item, "permitDate");

    engine.set_item_field("lineItems", item, "isHazmat", true).unwrap();
    engine.set_item_field("lineItems", item, "hazmatPlacards", 0.0).unwrap();
    engine.set_item_field("lineItems", item, "permitDate", "soon").unwrap();
    assert_eq!(engine.validate().errors.len(), 2);

    engine.set_item_field("lineItems", item, "isHazmat", false).unwrap();
    assert!(engine.validate().is_valid());
    assert!(engine.field_error(&placards).is_none());
    assert!(engine.field_error(&permit).is_none());
    assert!(engine.finalize().is_ok());

    let row = engine.document().group("lineItems").unwrap().get(item).unwrap();
    assert_eq!(row.get("permitDate"), Some(&FieldValue::text("soon")));
}

#[test]
fn append_twice_then_remove_first_keeps_second() {
    let mut engine = FormEngine::new(bill_of_lading());
    for id in engine.line_item_ids("lineItems") {
        engine.remove_line_item("lineItems", id);
    }
    assert!(engine.line_item_ids("lineItems").is_empty());

    let first = engine.append_default_item("lineItems").unwrap();
    let second = engine
        .append_line_item(
            "lineItems",
            vec![("description", FieldValue::text("paint")), ("quantity", FieldValue::Number(20.0))],
        )
        .unwrap();
    assert_ne!(first, second);
    assert_eq!(engine.line_item_ids("lineItems").len(), 2);
    let second_values = engine
        .document()
        .group("lineItems")
        .unwrap()
        .get(second)
        .unwrap()
        .clone();

    assert!(engine.remove_line_item("lineItems", first));
    let items = engine.document().group("lineItems").unwrap();
    assert_eq!(items.ids(), &[second]);
    assert_eq!(items.get(second), Some(&second_values));
}

#[test]
fn error_paths_survive_removal_of_earlier_rows() {
    let mut engine = FormEngine::new(bill_of_lading());
    let first = engine.line_item_ids("lineItems")[0];
    let second = engine.append_default_item("lineItems").unwrap();
    engine.set_item_field("lineItems", second, "quantity", "abc").unwrap();
    let path = FieldPath::item("lineItems", second, "quantity");
    let before = engine.validate().error_at(&path).map(str::to_string);
    assert_eq!(before.as_deref(), Some("Qty must be a number"));

    engine.remove_line_item("lineItems", first);
    assert_eq!(engine.validate().error_at(&path).map(str::to_string), before);
    assert_eq!(engine.field_error(&path), before.as_deref());
}

// ── Submission ──────────────────────────────────────────────────────

#[test]
fn complete_bill_of_lading_finalizes() {
    let mut engine = FormEngine::new(bill_of_lading());
    for (name, value) in [
        ("bolNumber", "BOL-7781"),
        ("shipDate", "2024-03-18"),
        ("shipperName", "Acme Paints"),
        ("shipperAddress", "1 Main St, Dallas TX"),
        ("consigneeName", "Hue Supply"),
        ("consigneeAddress", "9 Elm Ave, Tulsa OK"),
        ("carrierName", "Red River Freight"),
        ("shipperSignature", "data:image/png;base64,iVBORw0KGgo="),
    ] {
        engine.set_field(name, value).unwrap();
    }
    let item = engine.line_item_ids("lineItems")[0];
    engine.set_item_field("lineItems", item, "description", "Paint, 55 gal drum").unwrap();

    let done = engine.finalize().expect("document is complete");
    assert_eq!(done.document["lineItems"].as_array().map(Vec::len), Some(1));
    assert_eq!(done.document["freightPrepaid"], true);
}

#[test]
fn bad_ship_date_is_a_marker_not_an_error() {
    let mut engine = FormEngine::new(bill_of_lading());
    engine.set_field("shipDate", "18/03/2024").unwrap();
    assert_eq!(
        engine.field_error(&FieldPath::field("shipDate")),
        Some("Ship Date must be a date (YYYY-MM-DD)")
    );
    engine.set_field("bolNumber", "BOL-1").unwrap();
    assert_eq!(engine.document().field("bolNumber"), Some(&FieldValue::text("BOL-1")));
}

// ── Replacement and autofill ────────────────────────────────────────

#[test]
fn rejected_replacement_is_byte_identical() {
    let mut engine = FormEngine::new(bill_of_lading());
    engine.set_field("shipperName", "Acme").unwrap();
    let before = serde_json::to_vec(&engine.document().to_json()).unwrap();

    let candidates = [
        json!({ "shipperName": ["Acme"] }),
        json!({ "lineItems": [{ "quantity": "lots" }] }),
        json!({ "lineItems": [{ "colour": "red" }] }),
        json!({ "shipDate": "March 18" }),
        json!({ "unexpected": true }),
        json!(null),
    ];
    for candidate in candidates {
        let err = engine.replace_all(&candidate).unwrap_err();
        assert!(matches!(err, ReplaceError::Shape(_)), "{candidate}: {err}");
        assert_eq!(serde_json::to_vec(&engine.document().to_json()).unwrap(), before);
    }
}

#[test]
fn rapid_autofills_apply_only_the_newest() {
    let mut engine = FormEngine::new(bill_of_lading());
    let a = engine.begin_autofill(Some("first".into()));
    let b = engine.begin_autofill(Some("second".into()));

    // B's response arrives first.
    engine
        .finish_autofill(b, Ok(json!({ "shipperName": "From B" })))
        .unwrap();
    let late = engine
        .finish_autofill(a, Ok(json!({ "shipperName": "From A" })))
        .unwrap_err();
    assert!(matches!(late, AutofillError::Stale { .. }));
    assert_eq!(engine.document().field("shipperName"), Some(&FieldValue::text("From B")));
}

#[test]
fn invalid_autofill_candidate_is_discarded_with_notice() {
    let mut engine = FormEngine::new(bill_of_lading());
    let before = engine.document().to_json();
    let ticket = engine.begin_autofill(None);
    let err = engine
        .finish_autofill(ticket, Ok(json!({ "shipperName": "Acme", "lineItems": "three drums" })))
        .unwrap_err();
    assert!(matches!(err, AutofillError::ContractViolation(_)));
    assert!(err.user_notice().is_some());
    assert_eq!(engine.document().to_json(), before);
}

#[test]
fn autofill_group_replaces_items_wholesale() {
    let mut engine = FormEngine::new(bill_of_lading());
    engine.set_field("carrierName", "Red River Freight").unwrap();
    let old = engine.line_item_ids("lineItems");
    let ticket = engine.begin_autofill(Some("20 drums of paint, hazmat UN1263".into()));
    engine
        .finish_autofill(
            ticket,
            Ok(json!({
                "lineItems": [
                    { "quantity": 20, "description": "Paint", "weight": 9000, "isHazmat": true, "unNumber": "UN1263" }
                ]
            })),
        )
        .unwrap();

    let ids = engine.line_item_ids("lineItems");
    assert_eq!(ids.len(), 1);
    assert!(!old.contains(&ids[0]));
    assert_eq!(
        engine.document().field("carrierName"),
        Some(&FieldValue::text("Red River Freight"))
    );
}

// ── Property tests ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Edit {
    Quantity(usize, String),
    Hazmat(usize, bool),
    UnNumber(usize, String),
    Shipper(String),
    Append,
    Remove(usize),
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0usize..4, "[0-9a-z. ]{0,4}").prop_map(|(i, s)| Edit::Quantity(i, s)),
        (0usize..4, any::<bool>()).prop_map(|(i, b)| Edit::Hazmat(i, b)),
        (0usize..4, "(UN[0-9]{4})?").prop_map(|(i, s)| Edit::UnNumber(i, s)),
        "[A-Za-z ]{0,8}".prop_map(Edit::Shipper),
        Just(Edit::Append),
        (0usize..4).prop_map(Edit::Remove),
    ]
}

fn apply(engine: &mut FormEngine, e: Edit) {
    let ids = engine.line_item_ids("lineItems");
    let pick = |i: usize| (!ids.is_empty()).then(|| ids[i % ids.len()]);
    match e {
        Edit::Quantity(i, s) => {
            if let Some(id) = pick(i) {
                engine.set_item_field("lineItems", id, "quantity", s).unwrap();
            }
        }
        Edit::Hazmat(i, b) => {
            if let Some(id) = pick(i) {
                engine.set_item_field("lineItems", id, "isHazmat", b).unwrap();
            }
        }
        Edit::UnNumber(i, s) => {
            if let Some(id) = pick(i) {
                engine.set_item_field("lineItems", id, "unNumber", s).unwrap();
            }
        }
        Edit::Shipper(s) => engine.set_field("shipperName", s).unwrap(),
        Edit::Append => {
            engine.append_default_item("lineItems").unwrap();
        }
        Edit::Remove(i) => {
            if let Some(id) = pick(i) {
                engine.remove_line_item("lineItems", id);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Appending then removing the returned identity restores the list.
    #[test]
    fn append_then_remove_round_trips(
        start in 0usize..6,
        edits in prop::collection::vec(edit(), 0..8),
    ) {
        let mut engine = FormEngine::new(bill_of_lading());
        for id in engine.line_item_ids("lineItems") {
            engine.remove_line_item("lineItems", id);
        }
        for _ in 0..start {
            engine.append_default_item("lineItems").unwrap();
        }
        for e in edits {
            apply(&mut engine, e);
        }

        let before = item_snapshot(&engine);
        let id = engine.append_default_item("lineItems").unwrap();
        prop_assert_eq!(item_snapshot(&engine).len(), before.len() + 1);
        prop_assert!(engine.remove_line_item("lineItems", id));
        prop_assert_eq!(item_snapshot(&engine), before);
    }

    /// Validation is pure: two runs without mutation agree, and running
    /// it does not touch the document or the generation.
    #[test]
    fn validate_is_deterministic(edits in prop::collection::vec(edit(), 0..16)) {
        let mut engine = FormEngine::new(bill_of_lading());
        for e in edits {
            apply(&mut engine, e);
        }
        let doc = engine.document().to_json();
        let generation = engine.generation();

        let first = engine.validate();
        let second = engine.validate();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(engine.document().to_json(), doc);
        prop_assert_eq!(engine.generation(), generation);
    }

    /// Live markers never disagree with a full validation run for the
    /// fields they cover.
    #[test]
    fn live_markers_agree_with_validate(edits in prop::collection::vec(edit(), 0..16)) {
        let mut engine = FormEngine::new(bill_of_lading());
        for e in edits {
            apply(&mut engine, e);
        }
        let report = engine.validate();
        for (path, message) in engine.field_errors() {
            prop_assert_eq!(report.error_at(path), Some(message.as_str()));
        }
    }
}
