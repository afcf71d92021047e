use serde_json::{json, Value};
use whatpm_core::{
    validate_raw_item, validate_raw_items, ItemForm, ItemKind, ItemRejection, ItemType, RawRecord,
};

fn raw(value: Value) -> RawRecord {
    value.as_object().cloned().unwrap()
}

fn book_form() -> ItemForm {
    ItemForm {
        title: "Dune".to_string(),
        itemtype: "Book".to_string(),
        published_year: "1965".to_string(),
        author: Some("Frank Herbert".to_string()),
        ..ItemForm::default()
    }
}

#[test]
fn book_record_validates_and_drops_foreign_fields() {
    let item = validate_raw_item(&raw(json!({
        "id": "b1",
        "title": "Dune",
        "itemtype": "Book",
        "author": "Herbert",
        "director": "ignored",
        "season": 3,
        "published_year": 1965,
        "belongs_to_year": 2024,
        "redo": false,
    })))
    .unwrap();

    assert_eq!(
        item.kind,
        ItemKind::Book {
            author: "Herbert".to_string()
        }
    );
    let record = item.to_record();
    assert_eq!(record.director, None);
    assert_eq!(record.season, None);
    assert_eq!(record.created_at, None);
}

#[test]
fn movie_without_director_is_rejected() {
    let err = validate_raw_item(&raw(json!({
        "id": "m1",
        "title": "Arrival",
        "itemtype": "Movie",
        "published_year": 2016,
        "belongs_to_year": 2024,
        "redo": false,
    })))
    .unwrap_err();

    assert_eq!(
        err,
        ItemRejection::MissingField {
            itemtype: ItemType::Movie,
            field: "director"
        }
    );
}

#[test]
fn type_specific_field_must_be_present_and_non_empty() {
    let cases = [
        json!({"itemtype": "Book", "author": null}),
        json!({"itemtype": "Book", "author": ""}),
        json!({"itemtype": "Movie", "director": ""}),
        json!({"itemtype": "Show", "season": null}),
        json!({"itemtype": "Show", "season": 0}),
    ];

    for case in cases {
        let mut record = raw(json!({
            "id": "x",
            "title": "t",
            "published_year": 2000,
            "belongs_to_year": 2024,
            "redo": false,
        }));
        record.extend(raw(case.clone()));
        assert!(
            matches!(
                validate_raw_item(&record),
                Err(ItemRejection::MissingField { .. })
            ),
            "expected rejection for {case}"
        );
    }
}

#[test]
fn malformed_common_fields_are_structural_rejections() {
    let unknown_type = raw(json!({
        "id": "x", "title": "t", "itemtype": "book", "author": "a",
        "published_year": 2000, "belongs_to_year": 2024, "redo": false,
    }));
    let string_year = raw(json!({
        "id": "x", "title": "t", "itemtype": "Book", "author": "a",
        "published_year": "2000", "belongs_to_year": 2024, "redo": false,
    }));

    assert_eq!(
        validate_raw_item(&unknown_type),
        Err(ItemRejection::InvalidStructure)
    );
    assert_eq!(
        validate_raw_item(&string_year),
        Err(ItemRejection::InvalidStructure)
    );
}

#[test]
fn show_keeps_progress_only_when_boolean() {
    let show = validate_raw_item(&raw(json!({
        "id": "s1", "title": "Severance", "itemtype": "Show", "season": 2,
        "in_progress": true, "published_year": 2022, "belongs_to_year": 2025, "redo": true,
    })))
    .unwrap();
    assert_eq!(show.kind.in_progress(), Some(true));

    let legacy = validate_raw_item(&raw(json!({
        "id": "s2", "title": "Severance", "itemtype": "Show", "season": 1,
        "in_progress": null, "published_year": 2022, "belongs_to_year": 2022, "redo": false,
    })))
    .unwrap();
    assert_eq!(legacy.kind.in_progress(), None);
}

#[test]
fn batch_validation_keeps_order_of_valid_rows() {
    let rows = vec![
        raw(json!({"id": "1", "title": "A", "itemtype": "Book", "author": "x",
            "published_year": 2000, "belongs_to_year": 2024, "redo": false})),
        raw(json!({"id": "2", "title": "B", "itemtype": "Movie",
            "published_year": 2000, "belongs_to_year": 2024, "redo": false})),
        raw(json!({"id": "3", "title": "C", "itemtype": "Show", "season": 1,
            "published_year": 2000, "belongs_to_year": 2024, "redo": false})),
    ];

    let (items, rejected) = validate_raw_items(&rows);
    let ids: Vec<_> = items.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, ["1", "3"]);
    assert_eq!(rejected.len(), 1);
}

#[test]
fn valid_form_builds_trimmed_draft() {
    let form = ItemForm {
        title: "  Dune  ".to_string(),
        ..book_form()
    };
    let draft = form.validate(2024).unwrap();
    assert_eq!(draft.title, "Dune");
    assert_eq!(draft.published_year, 1965);
    assert_eq!(draft.belongs_to_year, None);
}

#[test]
fn form_reports_every_failed_rule() {
    let form = ItemForm {
        title: String::new(),
        itemtype: "Show".to_string(),
        published_year: "1599".to_string(),
        season: Some("51".to_string()),
        ..ItemForm::default()
    };
    let errors = form.validate(2024).unwrap_err();

    assert!(errors.contains("Title is required"));
    assert!(errors.contains("Year must be 1600 or later"));
    assert!(errors.contains("Season must be 50 or less"));
    assert_eq!(errors.messages().len(), 3);
}

#[test]
fn form_year_ceiling_moves_with_current_year() {
    let form = ItemForm {
        published_year: "2036".to_string(),
        ..book_form()
    };
    assert!(form
        .validate(2025)
        .unwrap_err()
        .contains("Year must be 2035 or earlier"));
    assert!(form.validate(2026).is_ok());
}

#[test]
fn form_rejects_bad_type_and_non_numeric_values() {
    let form = ItemForm {
        itemtype: "Podcast".to_string(),
        published_year: "nineteen".to_string(),
        ..book_form()
    };
    let errors = form.validate(2024).unwrap_err();
    assert!(errors.contains("Invalid item type"));
    assert!(errors.contains("Published year must be a whole number"));

    let show = ItemForm {
        itemtype: "Show".to_string(),
        season: Some("1.5".to_string()),
        ..book_form()
    };
    assert!(show
        .validate(2024)
        .unwrap_err()
        .contains("Season must be a whole number"));
}
