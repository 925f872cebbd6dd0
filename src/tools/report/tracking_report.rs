//! Tracking report tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::protocol::{McpTool, Tool};
use crate::server::{error_response, json_response};
use crate::tools::{report_properties, report_request};
use crate::tracking::Tracker;
use crate::types::McpResult;

/// Tool for reporting the recorded statements of a version
pub struct TrackingReportTool {
    tracker: Arc<Tracker>,
}

impl TrackingReportTool {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }
}

impl Tool for TrackingReportTool {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "tracking_report",
            "Report the statements recorded for a version, filtered by user and time window and ordered deterministically.",
            json!({
                "type": "object",
                "properties": report_properties(),
                "required": ["db", "table", "version"]
            }),
        )
    }

    fn execute(&self, params: Value) -> McpResult<Value> {
        let request = report_request(&params)?;

        match self.tracker.build_report(&request) {
            Some(report) => json_response(&report),
            None => Ok(error_response(format!(
                "version {} of {}.{} not found",
                request.version, request.db_name, request.table_name
            ))),
        }
    }
}
