//! Schema snapshot tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::protocol::{McpTool, Tool};
use crate::server::{error_response, json_response};
use crate::tools::{required_str, required_u32};
use crate::tracking::Tracker;
use crate::types::McpResult;

/// Tool for showing the structure captured by a version
pub struct SchemaSnapshotTool {
    tracker: Arc<Tracker>,
}

impl SchemaSnapshotTool {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }
}

impl Tool for SchemaSnapshotTool {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "schema_snapshot",
            "Show the columns, indexes and creation statement captured when a version was created.",
            json!({
                "type": "object",
                "properties": {
                    "db": { "type": "string", "description": "Database name" },
                    "table": { "type": "string", "description": "Table name" },
                    "version": { "type": "integer", "description": "Version number" }
                },
                "required": ["db", "table", "version"]
            }),
        )
    }

    fn execute(&self, params: Value) -> McpResult<Value> {
        let db = required_str(&params, "db")?;
        let table = required_str(&params, "table")?;
        let version = required_u32(&params, "version")?;

        match self.tracker.schema_snapshot(db, table, version) {
            Some(view) => json_response(&view),
            None => Ok(error_response(format!(
                "version {} of {}.{} not found",
                version, db, table
            ))),
        }
    }
}
