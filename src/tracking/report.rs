//! Tracking reports and snapshot views

use tracing::{debug, instrument};

use crate::types::{
    LogEntry, LogKind, ReportLine, ReportRequest, SnapshotView, TrackingReport, TrackingVersion,
};
use crate::utils::time::{now, Timestamp};

use super::filter::{filter, get_entries};
use super::versions::get_version;
use super::Tracker;

fn report_lines(
    entries: Vec<LogEntry>,
    log: LogKind,
    log_entries: &[LogEntry],
    first_line: usize,
) -> Vec<ReportLine> {
    entries
        .into_iter()
        .map(|entry| {
            let position = log_entries
                .iter()
                .position(|e| e.id == entry.id)
                .unwrap_or_default();
            ReportLine {
                line_number: first_line + position,
                log,
                entry,
            }
        })
        .collect()
}

/// Build a report for one version
///
/// The window defaults to `[date_created, now]`. DDL lines are numbered
/// from 1 by log position; DML lines continue after the last DDL line.
pub fn build_report(
    version: &TrackingVersion,
    request: &ReportRequest,
    now: Timestamp,
) -> TrackingReport {
    let from = request.date_from.unwrap_or(version.date_created);
    let to = request.date_to.unwrap_or(now);

    let ddl = if request.log_type.includes_schema() {
        let kept = filter(&version.ddlog, &request.users, from, to);
        report_lines(kept, LogKind::Ddl, &version.ddlog, 1)
    } else {
        Vec::new()
    };
    let dml = if request.log_type.includes_data() {
        let kept = filter(&version.dmlog, &request.users, from, to);
        report_lines(kept, LogKind::Dml, &version.dmlog, version.ddlog.len() + 1)
    } else {
        Vec::new()
    };

    TrackingReport {
        db_name: version.db_name.clone(),
        table_name: version.table_name.clone(),
        version: version.version,
        tracking: version.tracking_set.to_string(),
        tracking_active: version.active,
        log_type: request.log_type,
        users: request.users.clone(),
        date_from: from,
        date_to: to,
        ddl,
        dml,
        entries: get_entries(
            &version.ddlog,
            &version.dmlog,
            request.log_type,
            &request.users,
            from,
            to,
        ),
        no_data: version.ddlog.is_empty() && version.dmlog.is_empty(),
    }
}

#[instrument(skip(tracker))]
pub(crate) fn report_for(tracker: &Tracker, request: &ReportRequest) -> Option<TrackingReport> {
    let version = get_version(
        tracker,
        &request.db_name,
        &request.table_name,
        request.version,
    )?;
    let report = build_report(&version, request, now());
    debug!(entries = report.entries.len(), "report built");
    Some(report)
}

/// Decoded structure of a version plus its creation statements
pub fn snapshot_view(version: &TrackingVersion) -> SnapshotView {
    let mut create_sql = String::new();
    if let Some(first) = version.ddlog.first() {
        create_sql.push_str(&first.statement);
        let is_drop = first
            .statement
            .trim_start()
            .get(..4)
            .is_some_and(|verb| verb.eq_ignore_ascii_case("DROP"));
        if is_drop {
            if let Some(second) = version.ddlog.get(1) {
                create_sql.push_str(&second.statement);
            }
        }
    }

    SnapshotView {
        db_name: version.db_name.clone(),
        table_name: version.table_name.clone(),
        version: version.version,
        create_sql,
        columns: version.snapshot.columns.clone(),
        indexes: version.snapshot.indexes.clone(),
    }
}

pub(crate) fn schema_snapshot(
    tracker: &Tracker,
    db_name: &str,
    table_name: &str,
    version: u32,
) -> Option<SnapshotView> {
    get_version(tracker, db_name, table_name, version).map(|v| snapshot_view(&v))
}
