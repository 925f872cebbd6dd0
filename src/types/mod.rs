//! Data types for the table tracking engine
//!
//! This module contains the core data structures used throughout the crate.

mod log_entry;
mod outcome;
mod report;
mod snapshot;
mod statement;
mod version;

pub use log_entry::{next_entry_id, LogEntry, LogKind};
pub use outcome::Outcome;
pub use report::{
    DumpFile, ExecutionPolicy, ExecutionSummary, ExportMode, LogType, ReportLine, ReportRequest,
    StatementFailure, TrackingReport, UserFilter, ANY_USER,
};
pub use snapshot::{ColumnDescriptor, IndexDescriptor, SchemaSnapshot, SnapshotView};
pub use statement::{StatementKind, TrackingSet};
pub use version::{TrackingVersion, VersionKey, VersionRecord, VersionSummary};

/// Result type for tool and server operations
pub type McpResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;
