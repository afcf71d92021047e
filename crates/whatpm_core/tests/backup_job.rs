use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use std::cell::RefCell;
use whatpm_core::backup::store::{ObjectStore, StoreError};
use whatpm_core::{
    open_db_in_memory, BackupError, BackupService, FsObjectStore, ItemForm, ItemService,
    SqliteItemRepository,
};

const SECRET: &str = "cron-secret";

fn run_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 4, 0, 0).unwrap()
}

fn setup_service(conn: &Connection) -> ItemService<SqliteItemRepository<'_>> {
    ItemService::new(SqliteItemRepository::try_new(conn).unwrap())
}

fn add_movie(service: &ItemService<SqliteItemRepository<'_>>) {
    let form = ItemForm {
        title: "Arrival".to_string(),
        itemtype: "Movie".to_string(),
        published_year: "2016".to_string(),
        director: Some("Denis Villeneuve".to_string()),
        ..ItemForm::default()
    };
    service.create_item(&form, 2024).unwrap();
}

/// Store that records every put for assertions.
#[derive(Default)]
struct RecordingStore {
    puts: RefCell<Vec<(String, String)>>,
}

impl ObjectStore for RecordingStore {
    fn put_object(&self, key: &str, _body: &[u8], content_type: &str) -> Result<(), StoreError> {
        self.puts
            .borrow_mut()
            .push((key.to_string(), content_type.to_string()));
        Ok(())
    }
}

#[test]
fn authorized_run_writes_csv_and_json_under_date_prefix() {
    let conn = open_db_in_memory().unwrap();
    let items = setup_service(&conn);
    add_movie(&items);
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::new(dir.path());

    let summary = BackupService::new(&items, &store, Some(SECRET.to_string()))
        .run(Some("Bearer cron-secret"), run_at())
        .unwrap();

    assert_eq!(summary.timestamp, "2024-06-01");
    assert_eq!(summary.items_exported, 1);
    let files = summary.files.unwrap();
    assert_eq!(files.csv, "backups/2024-06-01/whatpm-backup-2024-06-01.csv");
    assert_eq!(files.json, "backups/2024-06-01/whatpm-backup-2024-06-01.json");

    let csv = std::fs::read_to_string(store.object_path(&files.csv).unwrap()).unwrap();
    assert!(csv.contains("\"Arrival\",\"Movie\""));
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.object_path(&files.json).unwrap()).unwrap())
            .unwrap();
    assert_eq!(json["metadata"]["totalItems"], 1);
}

#[test]
fn rerun_on_same_day_overwrites_same_keys() {
    let conn = open_db_in_memory().unwrap();
    let items = setup_service(&conn);
    add_movie(&items);
    let store = RecordingStore::default();
    let service = BackupService::new(&items, &store, Some(SECRET.to_string()));

    let first = service.run(Some("Bearer cron-secret"), run_at()).unwrap();
    add_movie(&items);
    let second = service.run(Some("Bearer cron-secret"), run_at()).unwrap();

    assert_eq!(first.files, second.files);
    assert_eq!(second.items_exported, 2);
    let puts = store.puts.borrow();
    assert_eq!(puts.len(), 4);
    assert_eq!(puts[0], puts[2]);
    assert_eq!(puts[1].1, "application/json");
}

#[test]
fn wrong_missing_or_unconfigured_secret_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let items = setup_service(&conn);
    add_movie(&items);
    let store = RecordingStore::default();

    let configured = BackupService::new(&items, &store, Some(SECRET.to_string()));
    assert!(matches!(
        configured.run(Some("Bearer nope"), run_at()),
        Err(BackupError::Unauthorized)
    ));
    assert!(matches!(
        configured.run(None, run_at()),
        Err(BackupError::Unauthorized)
    ));

    let unconfigured = BackupService::new(&items, &store, None);
    assert!(matches!(
        unconfigured.run(Some("Bearer "), run_at()),
        Err(BackupError::Unauthorized)
    ));
    assert!(store.puts.borrow().is_empty());
}

#[test]
fn empty_collection_uploads_nothing() {
    let conn = open_db_in_memory().unwrap();
    let items = setup_service(&conn);
    let store = RecordingStore::default();

    let summary = BackupService::new(&items, &store, Some(SECRET.to_string()))
        .run(Some("Bearer cron-secret"), run_at())
        .unwrap();

    assert_eq!(summary.items_exported, 0);
    assert_eq!(summary.files, None);
    assert_eq!(summary.message, "No items to export");
    assert!(store.puts.borrow().is_empty());
}

#[test]
fn stored_rows_that_all_fail_validation_still_write_empty_backups() {
    let conn = open_db_in_memory().unwrap();
    let items = setup_service(&conn);
    conn.execute(
        "INSERT INTO items (id, title, itemtype, published_year, belongs_to_year)
         VALUES ('broken', 'No Director', 'Movie', 2016, 2024);",
        [],
    )
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::new(dir.path());

    let summary = BackupService::new(&items, &store, Some(SECRET.to_string()))
        .run(Some("Bearer cron-secret"), run_at())
        .unwrap();

    assert_eq!(summary.items_exported, 0);
    let files = summary.files.unwrap();
    let csv = std::fs::read_to_string(store.object_path(&files.csv).unwrap()).unwrap();
    assert_eq!(csv, "No items to export");
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.object_path(&files.json).unwrap()).unwrap())
            .unwrap();
    assert_eq!(json["metadata"]["totalItems"], 0);
    assert_eq!(json["items"], serde_json::Value::Array(Vec::new()));
}

#[test]
fn summary_serializes_with_camel_case_keys() {
    let conn = open_db_in_memory().unwrap();
    let items = setup_service(&conn);
    let store = RecordingStore::default();
    let summary = BackupService::new(&items, &store, Some(SECRET.to_string()))
        .run(Some("Bearer cron-secret"), run_at())
        .unwrap();

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["itemsExported"], 0);
    assert_eq!(json["timestamp"], "2024-06-01");
}
