//! Table Tracker MCP Server - Binary Entry Point
//!
//! Configuration comes from `TRACKER_CONFIG`, `TRACKER_DATA_DIR` and
//! `TRACKER_LOG`; see [`table_tracker::config`].

use std::sync::Arc;

use tracing::info;

use table_tracker::config::TrackerConfig;
use table_tracker::logging::init_logging;
use table_tracker::protocol::ServerInfo;
use table_tracker::server::McpServer;
use table_tracker::tools::register_all_tools;
use table_tracker::tracking::Tracker;
use table_tracker::types::McpResult;

fn main() -> McpResult<()> {
    let config = TrackerConfig::load()?;
    init_logging(&config.log_level)?;

    info!(
        data_dir = %config.data_dir.display(),
        auto_create = config.version_auto_create,
        "starting {} {}",
        table_tracker::NAME,
        table_tracker::VERSION
    );

    // Every write is persisted before the call returns, nothing to flush
    ctrlc::set_handler(|| {
        info!("interrupted, shutting down");
        std::process::exit(0);
    })?;

    let tracker = Arc::new(Tracker::from_config(config)?);

    let server_info = ServerInfo::new(
        table_tracker::NAME.to_string(),
        table_tracker::VERSION.to_string(),
    );
    let mut server = McpServer::with_info(server_info);

    register_all_tools(&mut server, tracker);

    server.run()
}
