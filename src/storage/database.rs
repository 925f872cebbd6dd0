//! Database collaborator contract

use serde::{Deserialize, Serialize};

use crate::types::SchemaSnapshot;

/// Separator grouping table names into navigation groups (`log__2024`)
pub const TABLE_GROUP_SEPARATOR: &str = "__";

/// Result type for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Errors raised by the database collaborator
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("table {db}.{table} not found")]
    TableNotFound { db: String, table: String },

    #[error("statement failed: {0}")]
    Statement(String),

    #[error("invalid catalog: {0}")]
    Catalog(String),

    #[error("operation not supported: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Entry of a database's table list
///
/// Tables may be grouped (recursively) by name prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableNode {
    Table { name: String },
    Group { name: String, children: Vec<TableNode> },
}

impl TableNode {
    pub fn table(name: &str) -> Self {
        TableNode::Table {
            name: name.to_string(),
        }
    }

    /// Group a flat list of names on `separator`, one level per separator
    ///
    /// `log__2024__jan` lands in group `log`, subgroup `2024`. Names without
    /// the separator stay at the top level. Input order is kept.
    pub fn group_names<S: AsRef<str>>(names: &[S], separator: &str) -> Vec<TableNode> {
        let mut nodes: Vec<TableNode> = Vec::new();

        for name in names {
            let name = name.as_ref();
            let parts: Vec<&str> = if separator.is_empty() {
                vec![name]
            } else {
                name.split(separator).collect()
            };
            insert_grouped(&mut nodes, &parts, name);
        }

        nodes
    }
}

fn insert_grouped(nodes: &mut Vec<TableNode>, parts: &[&str], full_name: &str) {
    if parts.len() <= 1 {
        nodes.push(TableNode::table(full_name));
        return;
    }

    let group = parts[0];
    let existing = nodes
        .iter_mut()
        .position(|n| matches!(n, TableNode::Group { name, .. } if name == group));

    let index = match existing {
        Some(index) => index,
        None => {
            nodes.push(TableNode::Group {
                name: group.to_string(),
                children: Vec::new(),
            });
            nodes.len() - 1
        }
    };

    if let TableNode::Group { children, .. } = &mut nodes[index] {
        insert_grouped(children, &parts[1..], full_name);
    }
}

/// The tracked database
///
/// Implementations are responsible for quoting and escaping identifiers;
/// the engine only passes plain names.
pub trait Database: Send + Sync {
    /// Execute a statement
    fn execute(&self, sql: &str) -> DatabaseResult<()>;

    /// Current columns and indexes of a table
    fn fetch_structure(&self, db_name: &str, table_name: &str) -> DatabaseResult<SchemaSnapshot>;

    /// `CREATE` statement reproducing the table, if available
    fn show_create(&self, db_name: &str, table_name: &str) -> DatabaseResult<Option<String>>;

    /// Whether the relation is a view
    fn is_view(&self, db_name: &str, table_name: &str) -> DatabaseResult<bool>;

    /// Tables of a database, possibly grouped
    fn list_tables(&self, db_name: &str) -> DatabaseResult<Vec<TableNode>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_names_nests_on_separator() {
        let nodes = TableNode::group_names(
            &["users", "log__2023", "log__2024__jan", "log__2024__feb"],
            TABLE_GROUP_SEPARATOR,
        );

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0], TableNode::table("users"));
        match &nodes[1] {
            TableNode::Group { name, children } => {
                assert_eq!(name, "log");
                assert_eq!(children[0], TableNode::table("log__2023"));
                match &children[1] {
                    TableNode::Group { name, children } => {
                        assert_eq!(name, "2024");
                        assert_eq!(children.len(), 2);
                    }
                    other => panic!("expected group, got {:?}", other),
                }
            }
            other => panic!("expected group, got {:?}", other),
        }
    }
}
