//! Tracked tables tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::protocol::{McpTool, Tool};
use crate::server::json_response;
use crate::tools::required_str;
use crate::tracking::Tracker;
use crate::types::McpResult;

/// Tool for the tracked/untracked overview of a database
pub struct TrackedTablesTool {
    tracker: Arc<Tracker>,
}

impl TrackedTablesTool {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }
}

impl Tool for TrackedTablesTool {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "tracked_tables",
            "List the latest version of every tracked table in a database, and the tables that are not tracked yet.",
            json!({
                "type": "object",
                "properties": {
                    "db": { "type": "string", "description": "Database name" }
                },
                "required": ["db"]
            }),
        )
    }

    fn execute(&self, params: Value) -> McpResult<Value> {
        let db = required_str(&params, "db")?;

        json_response(&json!({
            "db": db,
            "tracked": self.tracker.tracked_tables(db),
            "untracked": self.tracker.untracked_tables(db)
        }))
    }
}
