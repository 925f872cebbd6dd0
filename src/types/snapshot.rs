//! Structure snapshot types

use serde::{Deserialize, Serialize};

/// One column of a table at snapshot time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub field: String,
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extra: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

impl ColumnDescriptor {
    /// Column with just a name and a type
    pub fn new(field: &str, column_type: &str) -> Self {
        Self {
            field: field.to_string(),
            column_type: column_type.to_string(),
            collation: None,
            nullable: false,
            key: String::new(),
            default: None,
            extra: String::new(),
            comment: String::new(),
        }
    }
}

/// One column of one index at snapshot time
///
/// A composite index is described by several descriptors sharing the same
/// `key_name`, ordered by `seq_in_index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDescriptor {
    pub key_name: String,
    pub column_name: String,
    #[serde(default = "default_seq")]
    pub seq_in_index: u32,
    #[serde(default)]
    pub non_unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_part: Option<u32>,
    #[serde(default)]
    pub index_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

fn default_seq() -> u32 {
    1
}

impl IndexDescriptor {
    pub fn new(key_name: &str, column_name: &str, unique: bool) -> Self {
        Self {
            key_name: key_name.to_string(),
            column_name: column_name.to_string(),
            seq_in_index: 1,
            non_unique: !unique,
            cardinality: None,
            sub_part: None,
            index_type: "BTREE".to_string(),
            comment: String::new(),
        }
    }
}

/// Structure of a table captured when a version is created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    #[serde(rename = "COLUMNS", default)]
    pub columns: Vec<ColumnDescriptor>,
    #[serde(rename = "INDEXES", default)]
    pub indexes: Vec<IndexDescriptor>,
}

impl SchemaSnapshot {
    pub fn new(columns: Vec<ColumnDescriptor>, indexes: Vec<IndexDescriptor>) -> Self {
        Self { columns, indexes }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.indexes.is_empty()
    }
}

/// Snapshot of a version as shown to report consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotView {
    pub db_name: String,
    pub table_name: String,
    pub version: u32,
    /// The seeded `DROP ... IF EXISTS` plus `CREATE` statements, if recorded
    pub create_sql: String,
    pub columns: Vec<ColumnDescriptor>,
    pub indexes: Vec<IndexDescriptor>,
}
