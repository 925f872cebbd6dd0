//! Create version tool

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::warn;

use crate::protocol::{McpTool, Tool};
use crate::server::json_response;
use crate::tools::{optional_str, optional_tracking_set, optional_u32, required_str};
use crate::tracking::Tracker;
use crate::types::McpResult;

/// Tool for starting a new tracking version of one or more tables
pub struct CreateVersionTool {
    tracker: Arc<Tracker>,
}

impl CreateVersionTool {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }
}

impl Tool for CreateVersionTool {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "create_version",
            "Snapshot the structure of a table and start tracking its statements in a new version. Pass `tables` to version several tables at once.",
            json!({
                "type": "object",
                "properties": {
                    "db": { "type": "string", "description": "Database name" },
                    "table": { "type": "string", "description": "Table name" },
                    "tables": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Several tables, each versioned independently"
                    },
                    "version": { "type": "integer", "description": "Version number (default: latest + 1)" },
                    "trackingSet": {
                        "description": "Statement kinds to record, e.g. \"INSERT,UPDATE\" (default: configured set)",
                        "oneOf": [
                            { "type": "string" },
                            { "type": "array", "items": { "type": "string" } }
                        ]
                    },
                    "isView": { "type": "boolean", "description": "Whether the table is a view (default: ask the database)" }
                },
                "required": ["db"]
            }),
        )
    }

    fn execute(&self, params: Value) -> McpResult<Value> {
        let db = required_str(&params, "db")?;
        let version = optional_u32(&params, "version")?;
        let tracking_set = optional_tracking_set(&params, "trackingSet");

        if let Some(tables) = params.get("tables").and_then(|v| v.as_array()) {
            let tables: Vec<String> = tables
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect();
            let outcomes =
                self.tracker
                    .create_for_multiple_tables(db, &tables, version, tracking_set.as_ref());
            return json_response(&outcomes);
        }

        let table = optional_str(&params, "table").ok_or("table or tables is required")?;
        let is_view = match params.get("isView").and_then(|v| v.as_bool()) {
            Some(is_view) => is_view,
            None => match self.tracker.database().is_view(db, table) {
                Ok(is_view) => is_view,
                Err(e) => {
                    warn!(table, error = %e, "cannot inspect table, tracking it as a base table");
                    false
                }
            },
        };

        let outcome =
            self.tracker
                .create_version(db, table, version, tracking_set.as_ref(), is_view);
        json_response(&outcome)
    }
}
