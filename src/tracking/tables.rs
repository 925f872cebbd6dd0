//! Tracked and untracked table overviews

use std::collections::BTreeSet;

use tracing::warn;

use crate::storage::TableNode;
use crate::types::VersionSummary;

use super::versions::load_records;
use super::Tracker;

/// Names of the tables in `nodes` that `is_tracked` rejects
///
/// Groups are walked recursively; tables come out in tree order.
pub fn extract_table_names<F>(nodes: &[TableNode], is_tracked: &F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let mut names = Vec::new();
    for node in nodes {
        match node {
            TableNode::Table { name } => {
                if !is_tracked(name) {
                    names.push(name.clone());
                }
            }
            TableNode::Group { children, .. } => {
                names.extend(extract_table_names(children, is_tracked));
            }
        }
    }
    names
}

fn tracked_names(tracker: &Tracker, db_name: &str) -> Vec<String> {
    tracker
        .repository
        .list_tracked_tables(db_name)
        .unwrap_or_else(|e| {
            warn!(db = db_name, error = %e, "cannot list tracked tables");
            Vec::new()
        })
}

/// Latest version of every tracked table, by table name
pub fn tracked_tables(tracker: &Tracker, db_name: &str) -> Vec<VersionSummary> {
    let mut names = tracked_names(tracker, db_name);
    names.sort();

    names
        .iter()
        .filter_map(|table| {
            load_records(tracker, db_name, table)
                .first()
                .map(VersionSummary::from)
        })
        .collect()
}

/// Tables of the database that have no version
pub fn untracked_tables(tracker: &Tracker, db_name: &str) -> Vec<String> {
    let tracked: BTreeSet<String> = tracked_names(tracker, db_name).into_iter().collect();

    let nodes = match tracker.database.list_tables(db_name) {
        Ok(nodes) => nodes,
        Err(e) => {
            warn!(db = db_name, error = %e, "cannot list tables");
            return Vec::new();
        }
    };

    extract_table_names(&nodes, &|name: &str| tracked.contains(name))
}
