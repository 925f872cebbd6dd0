//! Delete version tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::protocol::{McpTool, Tool};
use crate::server::json_response;
use crate::tools::{required_str, required_u32};
use crate::tracking::Tracker;
use crate::types::McpResult;

/// Tool for deleting a version with its snapshot and logs
pub struct DeleteVersionTool {
    tracker: Arc<Tracker>,
}

impl DeleteVersionTool {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }
}

impl Tool for DeleteVersionTool {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "delete_version",
            "Irreversibly delete a version together with its structure snapshot and both logs.",
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

        json_response(&self.tracker.delete_version(db, table, version))
    }
}
