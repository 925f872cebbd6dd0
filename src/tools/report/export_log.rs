//! Export log tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::protocol::{McpTool, Tool};
use crate::server::{error_response, json_response, text_response};
use crate::tools::{optional_str, report_properties, report_request};
use crate::tracking::Tracker;
use crate::types::{ExecutionPolicy, ExportMode, McpResult};

/// Tool for exporting or replaying recorded statements
pub struct ExportLogTool {
    tracker: Arc<Tracker>,
}

impl ExportLogTool {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }
}

impl Tool for ExportLogTool {
    fn definition(&self) -> McpTool {
        let mut properties = report_properties();
        properties["mode"] = json!({
            "type": "string",
            "enum": ["dump", "script", "execute"],
            "description": "dump: downloadable .sql file; script: replay into a temporary database; execute: run the statements again (default dump)"
        });
        properties["policy"] = json!({
            "type": "string",
            "enum": ["continue_on_error", "fail_fast"],
            "description": "For execute: keep going after a failing statement or stop (default continue_on_error)"
        });

        McpTool::new(
            "export_log",
            "Export the statements of a version report as a dump or script, or execute them again. Replayed statements are never recorded again.",
            json!({
                "type": "object",
                "properties": properties,
                "required": ["db", "table", "version"]
            }),
        )
    }

    fn execute(&self, params: Value) -> McpResult<Value> {
        let request = report_request(&params)?;
        let mode = match optional_str(&params, "mode") {
            Some(mode) => mode.parse::<ExportMode>()?,
            None => ExportMode::default(),
        };
        let policy = match params.get("policy") {
            Some(policy) => serde_json::from_value::<ExecutionPolicy>(policy.clone())?,
            None => ExecutionPolicy::default(),
        };

        let exported = match mode {
            ExportMode::Dump => self
                .tracker
                .export_dump(&request)
                .map(|file| json_response(&file)),
            ExportMode::Script => self
                .tracker
                .export_script(&request)
                .map(|script| Ok(text_response(script))),
            ExportMode::Execute => self
                .tracker
                .execute_log(&request, policy)
                .map(|summary| json_response(&summary)),
        };

        exported.unwrap_or_else(|| {
            Ok(error_response(format!(
                "version {} of {}.{} not found",
                request.version, request.db_name, request.table_name
            )))
        })
    }
}
