//! Behaviour every `TrackingRepository` implementation must share

use tempfile::TempDir;

use table_tracker::storage::{JsonFileRepository, MemoryRepository, StoreError, TrackingRepository};
use table_tracker::types::{VersionKey, VersionRecord};
use table_tracker::utils::time::parse_date;

fn record(db: &str, table: &str, version: u32) -> VersionRecord {
    let ts = parse_date("2024-05-01 10:00:00").unwrap();
    VersionRecord {
        db_name: db.to_string(),
        table_name: table.to_string(),
        version,
        date_created: ts,
        date_updated: ts,
        schema_snapshot: r#"{"COLUMNS":[],"INDEXES":[]}"#.to_string(),
        ddlog: String::new(),
        dmlog: String::new(),
        tracking: "INSERT,UPDATE".to_string(),
        tracking_active: true,
        next_ddl_id: 0,
        next_dml_id: 0,
    }
}

fn run_generic_repository_tests(repository: &dyn TrackingRepository) {
    // insert and read back verbatim
    let first = record("shop", "orders", 1);
    repository.insert_version(first.clone()).unwrap();
    assert_eq!(
        repository.get_version(&first.key()).unwrap(),
        Some(first.clone())
    );

    // one record per key
    assert!(matches!(
        repository.insert_version(first.clone()),
        Err(StoreError::AlreadyExists(_))
    ));

    repository.insert_version(record("shop", "orders", 2)).unwrap();
    repository.insert_version(record("shop", "customers", 1)).unwrap();
    repository.insert_version(record("crm", "orders", 7)).unwrap();

    let mut versions: Vec<u32> = repository
        .list_versions("shop", "orders")
        .unwrap()
        .iter()
        .map(|r| r.version)
        .collect();
    versions.sort();
    assert_eq!(versions, vec![1, 2]);

    assert_eq!(
        repository.list_tracked_tables("shop").unwrap(),
        vec!["customers".to_string(), "orders".to_string()]
    );

    // blobs are stored without reinterpretation
    let mut updated = first.clone();
    updated.dmlog = "opaque blob\nsecond line".to_string();
    updated.tracking_active = false;
    let replacement = updated.clone();
    assert!(repository
        .modify_version(&first.key(), &mut |record| {
            *record = replacement.clone();
            true
        })
        .unwrap());
    assert_eq!(repository.get_version(&first.key()).unwrap(), Some(updated.clone()));

    // a change that reports nothing modified is not stored
    assert!(repository
        .modify_version(&first.key(), &mut |record| {
            record.tracking_active = true;
            false
        })
        .unwrap());
    assert_eq!(repository.get_version(&first.key()).unwrap(), Some(updated));

    let missing = VersionKey::new("shop", "missing", 1);
    assert!(!repository.modify_version(&missing, &mut |_| true).unwrap());

    assert!(repository.delete_version(&first.key()).unwrap());
    assert!(!repository.delete_version(&first.key()).unwrap());
    assert_eq!(repository.get_version(&first.key()).unwrap(), None);
    assert_eq!(
        repository
            .get_version(&VersionKey::new("shop", "orders", 2))
            .unwrap()
            .map(|r| r.version),
        Some(2)
    );
}

#[test]
fn test_memory_repository() {
    run_generic_repository_tests(&MemoryRepository::new());
}

#[test]
fn test_json_file_repository() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tracking.jsonl");

    let repository = JsonFileRepository::open(&path).unwrap();
    run_generic_repository_tests(&repository);

    // everything written is visible after reopening
    let reopened = JsonFileRepository::open(&path).unwrap();
    let mut tables = reopened.list_tracked_tables("shop").unwrap();
    tables.extend(reopened.list_tracked_tables("crm").unwrap());
    assert_eq!(tables, vec!["customers", "orders", "orders"]);
    assert_eq!(
        reopened
            .get_version(&VersionKey::new("crm", "orders", 7))
            .unwrap()
            .map(|r| r.tracking),
        Some("INSERT,UPDATE".to_string())
    );
}
