//! Table Tracker
//!
//! Per-table change tracking for SQL databases. A table is tracked through
//! numbered versions; each version holds a snapshot of the table structure
//! and two append-only statement logs (DDL and DML) with user and time
//! attribution. Reports filter and order the logs deterministically and can
//! be exported as a dump or replayed against the database.
//!
//! # Modules
//!
//! - `types`: Core data structures (versions, log entries, snapshots, reports)
//! - `codec`: Encoding of snapshot and log blobs
//! - `storage`: Repository and database collaborators
//! - `tracking`: The engine (version lifecycle, recording, reports, export)
//! - `config`: Tracker configuration
//! - `logging`: Tracing subscriber setup
//! - `protocol`: MCP and JSON-RPC protocol types
//! - `server`: MCP server implementation
//! - `tools`: MCP tool implementations
//! - `utils`: Utility functions (timestamps, atomic writes)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use table_tracker::{McpServer, ServerInfo, Tracker, TrackerConfig};
//! use table_tracker::tools::register_all_tools;
//!
//! fn main() {
//!     let tracker = Arc::new(Tracker::from_config(TrackerConfig::default()).unwrap());
//!     let server_info = ServerInfo::new("table-tracker".to_string(), "0.3.0".to_string());
//!     let mut server = McpServer::with_info(server_info);
//!     register_all_tools(&mut server, tracker);
//!     server.run().unwrap();
//! }
//! ```

pub mod codec;
pub mod config;
pub mod logging;
pub mod protocol;
pub mod server;
pub mod storage;
pub mod tools;
pub mod tracking;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::TrackerConfig;
pub use protocol::{McpTool, ServerInfo, Tool};
pub use server::McpServer;
pub use storage::{Database, JsonFileRepository, MemoryRepository, TrackingRepository};
pub use tracking::{Tracker, TrackingError, TrackingResult};
pub use types::{
    LogEntry, LogKind, LogType, McpResult, Outcome, ReportRequest, SchemaSnapshot, StatementKind,
    TrackingReport, TrackingSet, TrackingVersion, UserFilter, VersionSummary,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
