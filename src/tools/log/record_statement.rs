//! Record statement tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::protocol::{McpTool, Tool};
use crate::server::json_response;
use crate::tools::{optional_str, required_str};
use crate::tracking::Tracker;
use crate::types::McpResult;

/// Tool for feeding an executed statement to the recording hook
pub struct RecordStatementTool {
    tracker: Arc<Tracker>,
}

impl RecordStatementTool {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }
}

impl Tool for RecordStatementTool {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "record_statement",
            "Record an executed statement against the latest version of its table. Recorded only when that version is active and tracks the statement's kind.",
            json!({
                "type": "object",
                "properties": {
                    "db": { "type": "string", "description": "Database name" },
                    "table": { "type": "string", "description": "Table the statement touched" },
                    "statement": { "type": "string", "description": "SQL text as executed" },
                    "username": { "type": "string", "description": "Who executed it (default: server user)" }
                },
                "required": ["db", "table", "statement"]
            }),
        )
    }

    fn execute(&self, params: Value) -> McpResult<Value> {
        let db = required_str(&params, "db")?;
        let table = required_str(&params, "table")?;
        let statement = required_str(&params, "statement")?;
        let username = optional_str(&params, "username").unwrap_or(self.tracker.current_user());

        let outcome = self.tracker.record_statement(db, table, statement, username);
        json_response(&outcome)
    }
}
