//! MCP Tools implementation
//!
//! The engine exposed as 10 MCP tools organized by category:
//! - Version tools (4): create, list, toggle, delete
//! - Log tools (2): record statements, delete entries
//! - Report tools (4): reports, snapshots, export, table overview

pub mod log;
pub mod report;
pub mod version;

use std::sync::Arc;

use serde_json::Value;

use crate::server::McpServer;
use crate::tracking::Tracker;
use crate::types::{LogType, McpResult, ReportRequest, TrackingSet, UserFilter};
use crate::utils::time::{parse_date, Timestamp, DATE_FORMAT};

pub use log::{DeleteLogEntriesTool, RecordStatementTool};
pub use report::{ExportLogTool, SchemaSnapshotTool, TrackedTablesTool, TrackingReportTool};
pub use version::{ChangeTrackingTool, CreateVersionTool, DeleteVersionTool, ListVersionsTool};

/// Register all tools with the MCP server
pub fn register_all_tools(server: &mut McpServer, tracker: Arc<Tracker>) {
    // Version tools (4)
    server.register_tool(Box::new(CreateVersionTool::new(tracker.clone())));
    server.register_tool(Box::new(ListVersionsTool::new(tracker.clone())));
    server.register_tool(Box::new(ChangeTrackingTool::new(tracker.clone())));
    server.register_tool(Box::new(DeleteVersionTool::new(tracker.clone())));

    // Log tools (2)
    server.register_tool(Box::new(RecordStatementTool::new(tracker.clone())));
    server.register_tool(Box::new(DeleteLogEntriesTool::new(tracker.clone())));

    // Report tools (4)
    server.register_tool(Box::new(TrackingReportTool::new(tracker.clone())));
    server.register_tool(Box::new(SchemaSnapshotTool::new(tracker.clone())));
    server.register_tool(Box::new(ExportLogTool::new(tracker.clone())));
    server.register_tool(Box::new(TrackedTablesTool::new(tracker)));
}

pub(crate) fn required_str<'a>(params: &'a Value, key: &str) -> McpResult<&'a str> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("{} is required", key).into())
}

pub(crate) fn optional_str<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

pub(crate) fn optional_u64(params: &Value, key: &str) -> McpResult<Option<u64>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| format!("{} must be a non-negative integer", key).into()),
    }
}

pub(crate) fn optional_u32(params: &Value, key: &str) -> McpResult<Option<u32>> {
    match optional_u64(params, key)? {
        None => Ok(None),
        Some(value) => Ok(Some(u32::try_from(value)?)),
    }
}

pub(crate) fn required_u32(params: &Value, key: &str) -> McpResult<u32> {
    optional_u32(params, key)?.ok_or_else(|| format!("{} is required", key).into())
}

pub(crate) fn optional_date(params: &Value, key: &str) -> McpResult<Option<Timestamp>> {
    match optional_str(params, key) {
        None => Ok(None),
        Some(raw) => parse_date(raw)
            .map(Some)
            .ok_or_else(|| format!("{} must use the format {}", key, DATE_FORMAT).into()),
    }
}

/// Tracking set given as `"INSERT,UPDATE"` or `["INSERT", "UPDATE"]`
pub(crate) fn optional_tracking_set(params: &Value, key: &str) -> Option<TrackingSet> {
    match params.get(key)? {
        Value::String(tokens) => Some(TrackingSet::parse(tokens)),
        Value::Array(items) => {
            let tokens: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
            Some(TrackingSet::parse(&tokens.join(",")))
        }
        _ => None,
    }
}

/// Report parameters shared by `tracking_report` and `export_log`
pub(crate) fn report_request(params: &Value) -> McpResult<ReportRequest> {
    let mut request = ReportRequest::new(
        required_str(params, "db")?,
        required_str(params, "table")?,
        required_u32(params, "version")?,
    );

    if let Some(log_type) = optional_str(params, "logType") {
        request = request.with_log_type(log_type.parse::<LogType>()?);
    }
    if let Some(users) = optional_str(params, "users") {
        request = request.with_users(UserFilter::parse(users));
    }

    Ok(request.with_window(
        optional_date(params, "dateFrom")?,
        optional_date(params, "dateTo")?,
    ))
}

/// JSON schema properties shared by report-style tools
pub(crate) fn report_properties() -> Value {
    serde_json::json!({
        "db": { "type": "string", "description": "Database name" },
        "table": { "type": "string", "description": "Table name" },
        "version": { "type": "integer", "description": "Version number" },
        "logType": {
            "type": "string",
            "enum": ["schema", "data", "schema_and_data"],
            "description": "Which logs to include (default schema_and_data)"
        },
        "users": { "type": "string", "description": "Comma-separated usernames, * for everyone (default *)" },
        "dateFrom": { "type": "string", "description": "Window start, YYYY-MM-DD HH:MM:SS (default: version creation)" },
        "dateTo": { "type": "string", "description": "Window end, YYYY-MM-DD HH:MM:SS (default: now)" }
    })
}
