//! Offline database backed by a structure catalog
//!
//! Table structures come from a JSON catalog file instead of a live
//! server. Executed statements are appended to a replay script, which
//! makes exports usable without a connection.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::{ColumnDescriptor, IndexDescriptor, SchemaSnapshot};

use super::database::{Database, DatabaseError, DatabaseResult, TableNode, TABLE_GROUP_SEPARATOR};

/// One table (or view) of the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub db: String,
    pub name: String,
    #[serde(default)]
    pub view: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub indexes: Vec<IndexDescriptor>,
}

impl TableDefinition {
    pub fn new(db: &str, name: &str) -> Self {
        Self {
            db: db.to_string(),
            name: name.to_string(),
            view: false,
            create: None,
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }
}

/// Database collaborator reading structures from a catalog
#[derive(Debug, Default)]
pub struct CatalogDatabase {
    tables: RwLock<BTreeMap<(String, String), TableDefinition>>,
    replay: Option<Mutex<File>>,
}

impl CatalogDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog file holding a JSON array of table definitions
    pub fn from_file<P: AsRef<Path>>(path: P) -> DatabaseResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let definitions: Vec<TableDefinition> = serde_json::from_str(&content)
            .map_err(|e| DatabaseError::Catalog(e.to_string()))?;

        let db = Self::new();
        for definition in definitions {
            db.add_table(definition);
        }
        info!(path = %path.as_ref().display(), tables = db.tables.read().len(), "loaded structure catalog");
        Ok(db)
    }

    /// Append executed statements to `path`
    pub fn with_replay_file<P: AsRef<Path>>(mut self, path: P) -> DatabaseResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        self.replay = Some(Mutex::new(file));
        Ok(self)
    }

    /// Add or replace a table definition
    pub fn add_table(&self, definition: TableDefinition) {
        let key = (definition.db.clone(), definition.name.clone());
        self.tables.write().insert(key, definition);
    }

    fn with_table<T, F>(&self, db_name: &str, table_name: &str, read: F) -> DatabaseResult<T>
    where
        F: FnOnce(&TableDefinition) -> T,
    {
        self.tables
            .read()
            .get(&(db_name.to_string(), table_name.to_string()))
            .map(read)
            .ok_or_else(|| DatabaseError::TableNotFound {
                db: db_name.to_string(),
                table: table_name.to_string(),
            })
    }
}

impl Database for CatalogDatabase {
    fn execute(&self, sql: &str) -> DatabaseResult<()> {
        let replay = self.replay.as_ref().ok_or_else(|| {
            DatabaseError::Unsupported("no replay file configured for the catalog database".into())
        })?;

        let mut file = replay.lock();
        file.write_all(sql.as_bytes())?;
        if !sql.ends_with('\n') {
            file.write_all(b"\n")?;
        }
        file.flush()?;

        debug!(bytes = sql.len(), "appended statement to replay file");
        Ok(())
    }

    fn fetch_structure(&self, db_name: &str, table_name: &str) -> DatabaseResult<SchemaSnapshot> {
        self.with_table(db_name, table_name, |t| {
            SchemaSnapshot::new(t.columns.clone(), t.indexes.clone())
        })
    }

    fn show_create(&self, db_name: &str, table_name: &str) -> DatabaseResult<Option<String>> {
        self.with_table(db_name, table_name, |t| t.create.clone())
    }

    fn is_view(&self, db_name: &str, table_name: &str) -> DatabaseResult<bool> {
        self.with_table(db_name, table_name, |t| t.view)
    }

    fn list_tables(&self, db_name: &str) -> DatabaseResult<Vec<TableNode>> {
        let names: Vec<String> = self
            .tables
            .read()
            .keys()
            .filter(|(db, _)| db == db_name)
            .map(|(_, name)| name.clone())
            .collect();
        Ok(TableNode::group_names(&names, TABLE_GROUP_SEPARATOR))
    }
}
