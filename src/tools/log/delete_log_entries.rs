//! Delete log entries tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::protocol::{McpTool, Tool};
use crate::server::json_response;
use crate::tools::{optional_u64, required_str, required_u32};
use crate::tracking::Tracker;
use crate::types::McpResult;

/// Tool for removing single entries from a version's logs
pub struct DeleteLogEntriesTool {
    tracker: Arc<Tracker>,
}

impl DeleteLogEntriesTool {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }
}

impl Tool for DeleteLogEntriesTool {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "delete_log_entries",
            "Delete one DDL and/or one DML entry from a version by id. Other entries keep their ids; unknown ids are ignored.",
            json!({
                "type": "object",
                "properties": {
                    "db": { "type": "string", "description": "Database name" },
                    "table": { "type": "string", "description": "Table name" },
                    "version": { "type": "integer", "description": "Version number" },
                    "ddlId": { "type": "integer", "description": "Id of the DDL entry to delete" },
                    "dmlId": { "type": "integer", "description": "Id of the DML entry to delete" }
                },
                "required": ["db", "table", "version"]
            }),
        )
    }

    fn execute(&self, params: Value) -> McpResult<Value> {
        let db = required_str(&params, "db")?;
        let table = required_str(&params, "table")?;
        let version = required_u32(&params, "version")?;
        let ddl_id = optional_u64(&params, "ddlId")?;
        let dml_id = optional_u64(&params, "dmlId")?;

        let outcomes = self
            .tracker
            .delete_log_entries(db, table, version, ddl_id, dml_id);
        let deleted = outcomes.iter().filter(|o| o.success).count();
        json_response(&json!({ "deleted": deleted, "outcomes": outcomes }))
    }
}
