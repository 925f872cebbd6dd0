//! Shared doubles for integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use table_tracker::config::TrackerConfig;
use table_tracker::storage::{
    Database, DatabaseError, DatabaseResult, MemoryRepository, StoreError, StoreResult, TableNode,
    TrackingRepository, TABLE_GROUP_SEPARATOR,
};
use table_tracker::tracking::Tracker;
use table_tracker::types::{
    ColumnDescriptor, IndexDescriptor, SchemaSnapshot, VersionKey, VersionRecord,
};

/// Database double that remembers every executed statement
///
/// Statements containing `FAIL` are rejected.
#[derive(Default)]
pub struct RecordingDatabase {
    tables: Mutex<BTreeMap<String, (bool, SchemaSnapshot)>>,
    pub executed: Mutex<Vec<String>>,
}

impl RecordingDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, name: &str) -> Self {
        let snapshot = SchemaSnapshot::new(
            vec![
                ColumnDescriptor::new("id", "int(11)"),
                ColumnDescriptor::new("x", "int(11)"),
            ],
            vec![IndexDescriptor::new("PRIMARY", "id", true)],
        );
        self.tables.lock().insert(name.to_string(), (false, snapshot));
        self
    }

    pub fn with_view(self, name: &str) -> Self {
        self.tables
            .lock()
            .insert(name.to_string(), (true, SchemaSnapshot::default()));
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().clone()
    }

    fn lookup<T>(
        &self,
        db_name: &str,
        table_name: &str,
        read: impl FnOnce(&(bool, SchemaSnapshot)) -> T,
    ) -> DatabaseResult<T> {
        self.tables
            .lock()
            .get(table_name)
            .map(read)
            .ok_or_else(|| DatabaseError::TableNotFound {
                db: db_name.to_string(),
                table: table_name.to_string(),
            })
    }
}

impl Database for RecordingDatabase {
    fn execute(&self, sql: &str) -> DatabaseResult<()> {
        if sql.contains("FAIL") {
            return Err(DatabaseError::Statement(format!("rejected: {}", sql.trim())));
        }
        self.executed.lock().push(sql.to_string());
        Ok(())
    }

    fn fetch_structure(&self, db_name: &str, table_name: &str) -> DatabaseResult<SchemaSnapshot> {
        self.lookup(db_name, table_name, |(_, snapshot)| snapshot.clone())
    }

    fn show_create(&self, db_name: &str, table_name: &str) -> DatabaseResult<Option<String>> {
        self.lookup(db_name, table_name, |(view, _)| {
            let kind = if *view { "VIEW" } else { "TABLE" };
            Some(format!("CREATE {} `{}` (`id` int(11), `x` int(11))", kind, table_name))
        })
    }

    fn is_view(&self, db_name: &str, table_name: &str) -> DatabaseResult<bool> {
        self.lookup(db_name, table_name, |(view, _)| *view)
    }

    fn list_tables(&self, _db_name: &str) -> DatabaseResult<Vec<TableNode>> {
        let names: Vec<String> = self.tables.lock().keys().cloned().collect();
        Ok(TableNode::group_names(&names, TABLE_GROUP_SEPARATOR))
    }
}

/// Repository whose reads work and whose writes always fail
#[derive(Default)]
pub struct ReadOnlyRepository {
    inner: MemoryRepository,
}

impl ReadOnlyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn refuse<T>() -> StoreResult<T> {
        Err(StoreError::Unavailable("repository is read-only".to_string()))
    }
}

impl TrackingRepository for ReadOnlyRepository {
    fn insert_version(&self, _record: VersionRecord) -> StoreResult<()> {
        Self::refuse()
    }

    fn get_version(&self, key: &VersionKey) -> StoreResult<Option<VersionRecord>> {
        self.inner.get_version(key)
    }

    fn list_versions(&self, db_name: &str, table_name: &str) -> StoreResult<Vec<VersionRecord>> {
        self.inner.list_versions(db_name, table_name)
    }

    fn list_tracked_tables(&self, db_name: &str) -> StoreResult<Vec<String>> {
        self.inner.list_tracked_tables(db_name)
    }

    fn modify_version(
        &self,
        _key: &VersionKey,
        _change: &mut dyn FnMut(&mut VersionRecord) -> bool,
    ) -> StoreResult<bool> {
        Self::refuse()
    }

    fn delete_version(&self, _key: &VersionKey) -> StoreResult<bool> {
        Self::refuse()
    }
}

/// Tracker over a memory repository and the given database
pub fn tracker_with(database: Arc<RecordingDatabase>) -> Tracker {
    Tracker::new(
        Arc::new(MemoryRepository::new()),
        database,
        TrackerConfig::default(),
    )
    .with_user("admin")
}

/// Tracker whose version creation seeds nothing into the DDL log
pub fn bare_tracker(database: Arc<RecordingDatabase>) -> Tracker {
    let config = TrackerConfig {
        add_drop_table: false,
        add_drop_view: false,
        ..TrackerConfig::default()
    };
    Tracker::new(Arc::new(MemoryRepository::new()), database, config).with_user("admin")
}
