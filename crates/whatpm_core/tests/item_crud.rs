use rusqlite::Connection;
use whatpm_core::{
    open_db_in_memory, ActionError, ItemForm, ItemKind, ItemService, SqliteItemRepository,
};

fn setup_service(conn: &Connection) -> ItemService<SqliteItemRepository<'_>> {
    ItemService::new(SqliteItemRepository::try_new(conn).unwrap())
}

fn book(title: &str, author: &str) -> ItemForm {
    ItemForm {
        title: title.to_string(),
        itemtype: "Book".to_string(),
        published_year: "1965".to_string(),
        author: Some(author.to_string()),
        ..ItemForm::default()
    }
}

fn show(title: &str, season: &str) -> ItemForm {
    ItemForm {
        title: title.to_string(),
        itemtype: "Show".to_string(),
        published_year: "2022".to_string(),
        season: Some(season.to_string()),
        in_progress: true,
        ..ItemForm::default()
    }
}

#[test]
fn create_logs_item_under_current_year_and_redirects() {
    let conn = open_db_in_memory().unwrap();
    let service = setup_service(&conn);

    let redirect = service.create_item(&book("Dune", "Frank Herbert"), 2024).unwrap();
    assert_eq!(redirect.location, "/year/2024");

    let item = service.get_item(&redirect.item_id).unwrap().unwrap();
    assert_eq!(item.title, "Dune");
    assert_eq!(item.belongs_to_year, 2024);
    assert!(!item.redo);
    assert!(item.created_at.is_some());
    assert_eq!(item.updated_at, None);
}

#[test]
fn create_with_invalid_form_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = setup_service(&conn);

    let err = service.create_item(&book("", "Frank Herbert"), 2024).unwrap_err();
    match err {
        ActionError::Validation(errors) => assert!(errors.contains("Title is required")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(service.items_for_year(2024).unwrap().is_empty());
}

#[test]
fn update_replaces_fields_and_can_move_year() {
    let conn = open_db_in_memory().unwrap();
    let service = setup_service(&conn);
    let id = service
        .create_item(&show("Severance", "1"), 2024)
        .unwrap()
        .item_id;

    let form = ItemForm {
        belongs_to_year: Some("2025".to_string()),
        in_progress: false,
        ..show("Severance", "2")
    };
    let redirect = service.update_item(&id, &form, 2025).unwrap();
    assert_eq!(redirect.location, "/year/2025");

    let item = service.get_item(&id).unwrap().unwrap();
    assert_eq!(
        item.kind,
        ItemKind::Show {
            season: 2,
            in_progress: Some(false)
        }
    );
    assert_eq!(item.belongs_to_year, 2025);
    assert!(item.updated_at.is_some());
    assert!(service.items_for_year(2024).unwrap().is_empty());
}

#[test]
fn update_without_year_keeps_stored_year() {
    let conn = open_db_in_memory().unwrap();
    let service = setup_service(&conn);
    let id = service.create_item(&book("Dune", "Herbert"), 2023).unwrap().item_id;

    let redirect = service
        .update_item(&id, &book("Dune Messiah", "Herbert"), 2024)
        .unwrap();
    assert_eq!(redirect.location, "/year/2023");
}

#[test]
fn update_rejects_type_change_and_unknown_id() {
    let conn = open_db_in_memory().unwrap();
    let service = setup_service(&conn);
    let id = service.create_item(&book("Dune", "Herbert"), 2024).unwrap().item_id;

    let err = service
        .update_item(&id, &show("Dune", "1"), 2024)
        .unwrap_err();
    match err {
        ActionError::Validation(errors) => {
            assert!(errors.contains("Item type cannot be changed"))
        }
        other => panic!("unexpected error: {other}"),
    }

    let missing = service
        .update_item("missing", &book("Dune", "Herbert"), 2024)
        .unwrap_err();
    assert!(matches!(missing, ActionError::NotFound(_)));
    assert_eq!(missing.user_message(), "Item not found.");
}

#[test]
fn delete_removes_item_and_redirects_to_its_year() {
    let conn = open_db_in_memory().unwrap();
    let service = setup_service(&conn);
    let id = service.create_item(&book("Dune", "Herbert"), 2022).unwrap().item_id;

    let redirect = service.delete_item(&id).unwrap();
    assert_eq!(redirect.location, "/year/2022");
    assert_eq!(service.get_item(&id).unwrap(), None);

    assert!(matches!(
        service.delete_item(&id),
        Err(ActionError::NotFound(_))
    ));
    assert!(matches!(
        service.delete_item("  "),
        Err(ActionError::Validation(_))
    ));
}

#[test]
fn year_listing_is_oldest_first_and_skips_invalid_rows() {
    let conn = open_db_in_memory().unwrap();
    let service = setup_service(&conn);
    service.create_item(&book("First", "A"), 2024).unwrap();
    service.create_item(&show("Second", "3"), 2024).unwrap();
    service.create_item(&book("Elsewhere", "B"), 2023).unwrap();
    conn.execute(
        "INSERT INTO items (id, title, itemtype, published_year, belongs_to_year)
         VALUES ('broken', 'No Director', 'Movie', 2016, 2024);",
        [],
    )
    .unwrap();

    let titles: Vec<_> = service
        .items_for_year(2024)
        .unwrap()
        .into_iter()
        .map(|item| item.title)
        .collect();
    assert_eq!(titles, ["First", "Second"]);

    assert_eq!(service.logged_years().unwrap(), [2024, 2023]);
    assert_eq!(service.get_item("broken").unwrap(), None);
}
