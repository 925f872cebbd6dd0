//! List versions tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::protocol::{McpTool, Tool};
use crate::server::json_response;
use crate::tools::required_str;
use crate::tracking::Tracker;
use crate::types::McpResult;

/// Tool for listing the versions of a table, newest first
pub struct ListVersionsTool {
    tracker: Arc<Tracker>,
}

impl ListVersionsTool {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }
}

impl Tool for ListVersionsTool {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "list_versions",
            "List the tracking versions of a table, newest first, with their tracking state.",
            json!({
                "type": "object",
                "properties": {
                    "db": { "type": "string", "description": "Database name" },
                    "table": { "type": "string", "description": "Table name" }
                },
                "required": ["db", "table"]
            }),
        )
    }

    fn execute(&self, params: Value) -> McpResult<Value> {
        let db = required_str(&params, "db")?;
        let table = required_str(&params, "table")?;

        let versions = self.tracker.list_versions(db, table);
        json_response(&json!({
            "db": db,
            "table": table,
            "lastVersion": versions.first().map(|v| v.version),
            "versions": versions
        }))
    }
}
