//! Export of recorded statements
//!
//! Three ways out of a version's logs: a downloadable dump, a script that
//! replays into a scratch database, and direct re-execution through the
//! database collaborator. Statement text is never altered.

use tracing::{info, instrument, warn};

use crate::storage::Database;
use crate::types::{
    DumpFile, ExecutionPolicy, ExecutionSummary, LogEntry, ReportRequest, StatementFailure,
};
use crate::utils::time::{format_date, now, Timestamp};

use super::report::report_for;
use super::Tracker;

/// Prefix marking statements the recording hook must skip
pub const NOTRACK_MARKER: &str = "/*NOTRACK*/\n";

/// Header of the temp-database script
pub const TEMP_DB_HEADER: &str = "# You can execute the dump by creating and using a temporary database. \
Please ensure that you have the privileges to do so.\n\
# Comment out these two lines if you do not need them.\n\
\n\
CREATE database IF NOT EXISTS pma_temp_db; \n\
USE pma_temp_db; \n\
\n";

/// Whether a statement carries the replay marker
pub fn is_untracked_statement(statement: &str) -> bool {
    statement
        .trim_start()
        .starts_with(NOTRACK_MARKER.trim_end())
}

/// Tag a statement so the recording hook skips it
pub fn untracked(statement: &str) -> String {
    format!("{}{}", NOTRACK_MARKER, statement)
}

/// Dump of `entries` in the given order, behind a header comment
pub fn build_dump(table_name: &str, entries: &[LogEntry], created: Timestamp) -> String {
    let mut dump = format!(
        "# Tracking report for table `{}`\n# {}\n",
        table_name,
        format_date(&created)
    );
    for entry in entries {
        dump.push_str(&entry.statement);
    }
    dump
}

/// Dump packaged for download as `log_<table>.sql`
///
/// Runs of whitespace in the table name collapse to a single space.
pub fn download_info(table_name: &str, entries: &[LogEntry], created: Timestamp) -> DumpFile {
    let table_name = table_name.split_whitespace().collect::<Vec<_>>().join(" ");
    DumpFile {
        filename: format!("log_{}.sql", table_name),
        dump: build_dump(&table_name, entries, created),
    }
}

/// Statements behind the temp-database header
pub fn build_script(entries: &[LogEntry]) -> String {
    let mut script = TEMP_DB_HEADER.to_string();
    for entry in entries {
        script.push_str(&entry.statement);
    }
    script
}

/// Replay entries through the database collaborator, in order
///
/// Each statement carries the replay marker so it is not recorded again.
pub fn execute(
    entries: &[LogEntry],
    database: &dyn Database,
    policy: ExecutionPolicy,
) -> ExecutionSummary {
    let mut summary = ExecutionSummary::default();

    for (index, entry) in entries.iter().enumerate() {
        match database.execute(&untracked(&entry.statement)) {
            Ok(()) => summary.executed += 1,
            Err(e) => {
                warn!(id = entry.id, error = %e, "replayed statement failed");
                summary.failures.push(StatementFailure {
                    entry_id: entry.id,
                    statement: entry.statement.clone(),
                    error: e.to_string(),
                });
                if policy == ExecutionPolicy::FailFast {
                    summary.skipped = entries.len() - index - 1;
                    break;
                }
            }
        }
    }

    summary
}

#[instrument(skip(tracker))]
pub(crate) fn export_dump(tracker: &Tracker, request: &ReportRequest) -> Option<DumpFile> {
    let report = report_for(tracker, request)?;
    Some(download_info(&request.table_name, &report.entries, now()))
}

#[instrument(skip(tracker))]
pub(crate) fn export_script(tracker: &Tracker, request: &ReportRequest) -> Option<String> {
    let report = report_for(tracker, request)?;
    Some(build_script(&report.entries))
}

#[instrument(skip(tracker))]
pub(crate) fn execute_log(
    tracker: &Tracker,
    request: &ReportRequest,
    policy: ExecutionPolicy,
) -> Option<ExecutionSummary> {
    let report = report_for(tracker, request)?;
    let summary = execute(&report.entries, tracker.database.as_ref(), policy);
    info!(
        executed = summary.executed,
        failed = summary.failures.len(),
        skipped = summary.skipped,
        "log replayed"
    );
    Some(summary)
}
