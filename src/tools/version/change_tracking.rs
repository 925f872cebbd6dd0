//! Change tracking tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::protocol::{McpTool, Tool};
use crate::server::json_response;
use crate::tools::{required_str, required_u32};
use crate::tracking::Tracker;
use crate::types::McpResult;

/// Tool for activating or deactivating a version
pub struct ChangeTrackingTool {
    tracker: Arc<Tracker>,
}

impl ChangeTrackingTool {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }
}

impl Tool for ChangeTrackingTool {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "change_tracking",
            "Activate or deactivate statement recording for a version. Logs are kept either way.",
            json!({
                "type": "object",
                "properties": {
                    "db": { "type": "string", "description": "Database name" },
                    "table": { "type": "string", "description": "Table name" },
                    "version": { "type": "integer", "description": "Version number" },
                    "active": { "type": "boolean", "description": "true to activate, false to deactivate" }
                },
                "required": ["db", "table", "version", "active"]
            }),
        )
    }

    fn execute(&self, params: Value) -> McpResult<Value> {
        let db = required_str(&params, "db")?;
        let table = required_str(&params, "table")?;
        let version = required_u32(&params, "version")?;
        let active = params
            .get("active")
            .and_then(|v| v.as_bool())
            .ok_or("active is required")?;

        let outcome = if active {
            self.tracker.activate(db, table, version)
        } else {
            self.tracker.deactivate(db, table, version)
        };
        json_response(&outcome)
    }
}
