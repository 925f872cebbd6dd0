//! Report and export tools

mod export_log;
mod schema_snapshot;
mod tracked_tables;
mod tracking_report;

pub use export_log::ExportLogTool;
pub use schema_snapshot::SchemaSnapshotTool;
pub use tracked_tables::TrackedTablesTool;
pub use tracking_report::TrackingReportTool;
