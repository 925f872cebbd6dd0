//! Statement recording and log entry deletion

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::codec;
use crate::types::{LogEntry, LogKind, Outcome, StatementKind, TrackingSet, VersionKey};
use crate::utils::time::now;

use super::export::is_untracked_statement;
use super::versions::{create_version, try_last_version_number};
use super::{Tracker, TrackingError, TrackingResult};

/// What the recording hook did with a statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    Recorded { version: u32, log: LogKind, id: u64 },
    /// Carries the replay marker
    Untracked,
    /// Leading keyword is not a tracked statement kind
    Unclassified,
    /// Table has no version
    NotTracked,
    /// Latest version is deactivated
    Inactive { version: u32 },
    /// Latest version does not observe this kind
    KindNotTracked { version: u32, kind: String },
    Failed { message: String },
}

impl RecordOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, RecordOutcome::Recorded { .. })
    }
}

/// Terminate a statement with `;\n` so dumps concatenate cleanly
fn terminate(statement: &str) -> String {
    let statement = statement.trim_end();
    if statement.ends_with(';') {
        format!("{}\n", statement)
    } else {
        format!("{};\n", statement)
    }
}

fn auto_create(
    tracker: &Tracker,
    db_name: &str,
    table_name: &str,
    kind: StatementKind,
) -> Option<RecordOutcome> {
    let is_view = match kind {
        StatementKind::CreateTable => false,
        StatementKind::CreateView => true,
        _ => return Some(RecordOutcome::NotTracked),
    };

    let outcome = create_version(tracker, db_name, table_name, Some(1), None, is_view);
    if outcome.success {
        info!(db = db_name, table = table_name, "started tracking new table");
        None
    } else {
        Some(RecordOutcome::Failed {
            message: outcome.message,
        })
    }
}

fn try_record(
    tracker: &Tracker,
    db_name: &str,
    table_name: &str,
    statement: &str,
    username: &str,
) -> TrackingResult<RecordOutcome> {
    if is_untracked_statement(statement) {
        debug!("statement carries the replay marker");
        return Ok(RecordOutcome::Untracked);
    }

    let Some(kind) = StatementKind::classify(statement) else {
        return Ok(RecordOutcome::Unclassified);
    };

    let version = match try_last_version_number(tracker, db_name, table_name)? {
        Some(version) => version,
        None if tracker.config.version_auto_create => {
            if let Some(outcome) = auto_create(tracker, db_name, table_name, kind) {
                return Ok(outcome);
            }
            1
        }
        None => return Ok(RecordOutcome::NotTracked),
    };

    let key = VersionKey::new(db_name, table_name, version);
    let log_kind = kind.log_kind();
    let mut outcome = None;

    // Only the target log blob is rewritten; snapshot and the other log
    // stay byte-for-byte as stored.
    let found = tracker.repository.modify_version(&key, &mut |record| {
        if !record.tracking_active {
            outcome = Some(RecordOutcome::Inactive { version });
            return false;
        }
        if !TrackingSet::parse(&record.tracking).contains(kind) {
            outcome = Some(RecordOutcome::KindNotTracked {
                version,
                kind: kind.to_string(),
            });
            return false;
        }

        let timestamp = now();
        let id = record.allocate_entry_id(log_kind);
        let entry = LogEntry::new(id, timestamp, username.to_string(), terminate(statement));
        if let Err(e) = codec::log::append(record.log_blob_mut(log_kind), &entry) {
            outcome = Some(RecordOutcome::Failed {
                message: e.to_string(),
            });
            return false;
        }
        record.date_updated = timestamp;

        outcome = Some(RecordOutcome::Recorded {
            version,
            log: log_kind,
            id,
        });
        true
    })?;

    match outcome {
        Some(outcome) if found => Ok(outcome),
        _ => Err(TrackingError::VersionNotFound(key)),
    }
}

/// Append an executed statement to the latest version of its table
///
/// The statement is recorded only if the latest version is active and its
/// tracking set contains the statement's kind. Statements carrying the
/// replay marker are never recorded.
#[instrument(skip(tracker, statement))]
pub fn record_statement(
    tracker: &Tracker,
    db_name: &str,
    table_name: &str,
    statement: &str,
    username: &str,
) -> RecordOutcome {
    match try_record(tracker, db_name, table_name, statement, username) {
        Ok(outcome) => {
            debug!(?outcome, "statement processed");
            outcome
        }
        Err(e) => {
            warn!(error = %e, "could not record statement");
            RecordOutcome::Failed {
                message: e.to_string(),
            }
        }
    }
}

fn try_delete_entries(
    tracker: &Tracker,
    key: &VersionKey,
    targets: &[(LogKind, u64)],
) -> TrackingResult<Vec<(LogKind, u64)>> {
    let mut removed = Vec::new();

    let found = tracker.repository.modify_version(key, &mut |record| {
        removed.clear();
        for &(kind, id) in targets {
            record.settle_entry_ids(kind);
            if let Some(blob) = codec::log::remove(record.log_blob(kind), id) {
                *record.log_blob_mut(kind) = blob;
                removed.push((kind, id));
            }
        }

        if removed.is_empty() {
            return false;
        }
        record.date_updated = now();
        true
    })?;

    if !found {
        return Err(TrackingError::VersionNotFound(key.clone()));
    }
    Ok(removed)
}

/// Remove single entries from a version's logs
///
/// Remaining entries keep their ids. An id that is not in the log is
/// ignored.
#[instrument(skip(tracker))]
pub fn delete_log_entries(
    tracker: &Tracker,
    db_name: &str,
    table_name: &str,
    version: u32,
    ddl_id: Option<u64>,
    dml_id: Option<u64>,
) -> Vec<Outcome> {
    let key = VersionKey::new(db_name, table_name, version);
    let targets: Vec<(LogKind, u64)> = [(LogKind::Ddl, ddl_id), (LogKind::Dml, dml_id)]
        .into_iter()
        .filter_map(|(kind, id)| id.map(|id| (kind, id)))
        .collect();

    if targets.is_empty() {
        return Vec::new();
    }

    match try_delete_entries(tracker, &key, &targets) {
        Ok(removed) => removed
            .into_iter()
            .map(|(kind, id)| {
                info!(log = %kind, id, "log entry deleted");
                Outcome::ok(format!("{} entry {} of {} was deleted.", kind, id, key))
                    .with_version(version)
            })
            .collect(),
        Err(e) => {
            warn!(error = %e, "could not delete log entries");
            vec![Outcome::failed(format!("Could not delete log entries of {}: {}", key, e))
                .with_version(version)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::TrackerConfig;
    use crate::storage::{CatalogDatabase, MemoryRepository, TableDefinition};
    use crate::tracking::NOTRACK_MARKER;

    fn tracker(config: TrackerConfig) -> Tracker {
        let database = CatalogDatabase::new();
        database.add_table(TableDefinition::new("shop", "orders"));
        Tracker::new(Arc::new(MemoryRepository::new()), Arc::new(database), config)
            .with_user("admin")
    }

    fn no_seed() -> TrackerConfig {
        TrackerConfig {
            add_drop_table: false,
            ..TrackerConfig::default()
        }
    }

    #[test]
    fn test_terminate() {
        assert_eq!(terminate("DELETE FROM t"), "DELETE FROM t;\n");
        assert_eq!(terminate("DELETE FROM t;\n\n"), "DELETE FROM t;\n");
    }

    #[test]
    fn test_records_into_matching_log() {
        let tracker = tracker(no_seed());
        tracker.create_version("shop", "orders", None, None, false);

        let outcome = tracker.record_statement("shop", "orders", "INSERT INTO orders VALUES (1)", "alice");
        assert_eq!(
            outcome,
            RecordOutcome::Recorded {
                version: 1,
                log: LogKind::Dml,
                id: 0
            }
        );
        let outcome = tracker.record_statement("shop", "orders", "ALTER TABLE orders ADD note text", "bob");
        assert!(matches!(outcome, RecordOutcome::Recorded { log: LogKind::Ddl, id: 0, .. }));

        let version = tracker.get_version("shop", "orders", 1).unwrap();
        assert_eq!(version.dmlog[0].username, "alice");
        assert_eq!(version.dmlog[0].statement, "INSERT INTO orders VALUES (1);\n");
        assert_eq!(version.ddlog[0].username, "bob");
    }

    #[test]
    fn test_untracked_situations_are_skipped() {
        let tracker = tracker(no_seed());
        assert_eq!(
            tracker.record_statement("shop", "orders", "INSERT INTO orders VALUES (1)", "alice"),
            RecordOutcome::NotTracked
        );

        let set = TrackingSet::from_kinds([StatementKind::Insert]);
        tracker.create_version("shop", "orders", None, Some(&set), false);

        assert_eq!(
            tracker.record_statement("shop", "orders", "SELECT * FROM orders", "alice"),
            RecordOutcome::Unclassified
        );
        assert!(matches!(
            tracker.record_statement("shop", "orders", "DELETE FROM orders", "alice"),
            RecordOutcome::KindNotTracked { version: 1, .. }
        ));

        let replayed = format!("{}INSERT INTO orders VALUES (1)", NOTRACK_MARKER);
        assert_eq!(
            tracker.record_statement("shop", "orders", &replayed, "alice"),
            RecordOutcome::Untracked
        );

        tracker.deactivate("shop", "orders", 1);
        assert_eq!(
            tracker.record_statement("shop", "orders", "INSERT INTO orders VALUES (1)", "alice"),
            RecordOutcome::Inactive { version: 1 }
        );
        assert!(tracker.get_version("shop", "orders", 1).unwrap().dmlog.is_empty());
    }

    #[test]
    fn test_auto_create_on_create_table() {
        let config = TrackerConfig {
            version_auto_create: true,
            ..no_seed()
        };
        let tracker = tracker(config);

        let outcome = tracker.record_statement("shop", "orders", "CREATE TABLE orders (id int)", "alice");
        assert!(outcome.is_recorded(), "{:?}", outcome);
        assert_eq!(tracker.last_version_number("shop", "orders"), Some(1));

        assert_eq!(
            tracker.record_statement("shop", "unknown", "INSERT INTO unknown VALUES (1)", "alice"),
            RecordOutcome::NotTracked
        );
    }

    #[test]
    fn test_delete_entries_keeps_ids() {
        let tracker = tracker(no_seed());
        tracker.create_version("shop", "orders", None, None, false);
        for n in 0..4 {
            let sql = format!("INSERT INTO orders VALUES ({})", n);
            tracker.record_statement("shop", "orders", &sql, "alice");
        }

        let outcomes = tracker.delete_log_entries("shop", "orders", 1, None, Some(2));
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].success);

        let ids: Vec<u64> = tracker
            .get_version("shop", "orders", 1)
            .unwrap()
            .dmlog
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![0, 1, 3]);

        // the next append does not reuse a deleted id
        tracker.record_statement("shop", "orders", "INSERT INTO orders VALUES (9)", "alice");
        let last = tracker.get_version("shop", "orders", 1).unwrap().dmlog.pop().unwrap();
        assert_eq!(last.id, 4);
    }

    #[test]
    fn test_deleted_highest_id_is_not_reused() {
        let tracker = tracker(no_seed());
        tracker.create_version("shop", "orders", None, None, false);
        for n in 0..4 {
            let sql = format!("INSERT INTO orders VALUES ({})", n);
            tracker.record_statement("shop", "orders", &sql, "alice");
        }

        assert_eq!(tracker.delete_log_entries("shop", "orders", 1, None, Some(3)).len(), 1);
        let outcome = tracker.record_statement("shop", "orders", "INSERT INTO orders VALUES (4)", "alice");
        assert!(matches!(outcome, RecordOutcome::Recorded { id: 4, .. }), "{:?}", outcome);

        // a stale delete of id 3 must not hit the new statement
        assert!(tracker.delete_log_entries("shop", "orders", 1, None, Some(3)).is_empty());
        let ids: Vec<u64> = tracker
            .get_version("shop", "orders", 1)
            .unwrap()
            .dmlog
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![0, 1, 2, 4]);
    }

    #[test]
    fn test_appending_keeps_stored_blobs_verbatim() {
        let tracker = tracker(no_seed());
        tracker.create_version("shop", "orders", None, None, false);
        tracker.record_statement("shop", "orders", "ALTER TABLE orders ADD note text", "bob");

        let key = VersionKey::new("shop", "orders", 1);
        let legacy_snapshot = "a:2:{s:7:\"COLUMNS\";a:0:{}s:7:\"INDEXES\";a:0:{}}";
        tracker
            .repository()
            .modify_version(&key, &mut |record| {
                record.schema_snapshot = legacy_snapshot.to_string();
                record.dmlog = "LEGACY-LINE\n".to_string();
                true
            })
            .unwrap();
        let before = tracker.repository().get_version(&key).unwrap().unwrap();

        let outcome = tracker.record_statement("shop", "orders", "INSERT INTO orders VALUES (1)", "alice");
        assert!(outcome.is_recorded(), "{:?}", outcome);

        let after = tracker.repository().get_version(&key).unwrap().unwrap();
        assert_eq!(after.schema_snapshot, legacy_snapshot);
        assert_eq!(after.ddlog, before.ddlog);
        assert!(after.dmlog.starts_with("LEGACY-LINE\n"));
        assert_eq!(after.dmlog.lines().count(), 2);

        // deleting an entry leaves the unreadable line and the snapshot alone
        let outcomes = tracker.delete_log_entries("shop", "orders", 1, Some(0), Some(0));
        assert_eq!(outcomes.len(), 2);
        let after = tracker.repository().get_version(&key).unwrap().unwrap();
        assert_eq!(after.schema_snapshot, legacy_snapshot);
        assert_eq!(after.dmlog, "LEGACY-LINE\n");
        assert_eq!(after.ddlog, "");
    }

    #[test]
    fn test_delete_unknown_entry_is_noop() {
        let tracker = tracker(no_seed());
        tracker.create_version("shop", "orders", None, None, false);

        assert!(tracker.delete_log_entries("shop", "orders", 1, Some(7), None).is_empty());
        assert!(tracker.delete_log_entries("shop", "orders", 1, None, None).is_empty());

        let outcomes = tracker.delete_log_entries("shop", "orders", 2, Some(0), None);
        assert_eq!(outcomes.len(), 1);
        assert!(!outcomes[0].success);
    }
}
