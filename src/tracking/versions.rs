//! Version lifecycle

use tracing::{info, instrument, warn};

use crate::types::{
    LogEntry, Outcome, TrackingSet, TrackingVersion, VersionKey, VersionRecord, VersionSummary,
};
use crate::utils::time::now;

use super::{Tracker, TrackingAction, TrackingError, TrackingResult, TrackingState};

/// Quote an identifier with backticks
pub(crate) fn backquote(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// Statements a new version's DDL log starts with
fn seed_ddlog(
    tracker: &Tracker,
    db_name: &str,
    table_name: &str,
    is_view: bool,
) -> TrackingResult<Vec<String>> {
    let mut statements = Vec::new();

    if is_view && tracker.config.add_drop_view {
        statements.push(format!("DROP VIEW IF EXISTS {};\n", backquote(table_name)));
    } else if !is_view && tracker.config.add_drop_table {
        statements.push(format!("DROP TABLE IF EXISTS {};\n", backquote(table_name)));
    }

    if let Some(create) = tracker.database.show_create(db_name, table_name)? {
        let create = create.trim_end().trim_end_matches(';');
        statements.push(format!("{};\n", create));
    }

    Ok(statements)
}

fn next_version_number(
    tracker: &Tracker,
    db_name: &str,
    table_name: &str,
    requested: Option<u32>,
) -> TrackingResult<u32> {
    let latest = try_last_version_number(tracker, db_name, table_name)?;

    match (requested, latest) {
        (Some(0), _) => Err(TrackingError::InvalidVersion),
        (Some(requested), Some(latest)) if requested <= latest => {
            Err(TrackingError::VersionNotIncreasing {
                db_name: db_name.to_string(),
                table_name: table_name.to_string(),
                requested,
                latest,
            })
        }
        (Some(requested), _) => Ok(requested),
        (None, Some(latest)) => Ok(latest + 1),
        (None, None) => Ok(1),
    }
}

fn try_create_version(
    tracker: &Tracker,
    db_name: &str,
    table_name: &str,
    version: Option<u32>,
    tracking_set: Option<&TrackingSet>,
    is_view: bool,
) -> TrackingResult<u32> {
    let version = next_version_number(tracker, db_name, table_name, version)?;
    TrackingState::Untracked.apply(TrackingAction::Create)?;

    let snapshot = tracker.database.fetch_structure(db_name, table_name)?;
    let timestamp = now();
    let ddlog = seed_ddlog(tracker, db_name, table_name, is_view)?
        .into_iter()
        .enumerate()
        .map(|(id, statement)| {
            LogEntry::new(id as u64, timestamp, tracker.current_user.clone(), statement)
        })
        .collect();

    let tracked = TrackingVersion {
        db_name: db_name.to_string(),
        table_name: table_name.to_string(),
        version,
        date_created: timestamp,
        date_updated: timestamp,
        tracking_set: tracking_set
            .cloned()
            .unwrap_or_else(|| tracker.config.default_statements.clone()),
        active: true,
        snapshot,
        ddlog,
        dmlog: Vec::new(),
    };

    tracker.repository.insert_version(tracked.to_record())?;
    Ok(version)
}

/// Create a version capturing the table's current structure
///
/// `version` defaults to the latest version plus one. The new version is
/// active immediately.
#[instrument(skip(tracker, tracking_set))]
pub fn create_version(
    tracker: &Tracker,
    db_name: &str,
    table_name: &str,
    version: Option<u32>,
    tracking_set: Option<&TrackingSet>,
    is_view: bool,
) -> Outcome {
    match try_create_version(tracker, db_name, table_name, version, tracking_set, is_view) {
        Ok(version) => {
            info!(version, "tracking version created");
            Outcome::ok(format!(
                "Version {} was created, tracking for {}.{} is active.",
                version, db_name, table_name
            ))
            .with_version(version)
        }
        Err(e) => {
            warn!(error = %e, "could not create tracking version");
            Outcome::failed(format!(
                "Could not create version of {}.{}: {}",
                db_name, table_name, e
            ))
        }
    }
}

/// Create one independent version per table
///
/// A failure for one table does not stop the others.
#[instrument(skip(tracker, tracking_set))]
pub fn create_for_multiple_tables(
    tracker: &Tracker,
    db_name: &str,
    tables: &[String],
    version: Option<u32>,
    tracking_set: Option<&TrackingSet>,
) -> Vec<Outcome> {
    if tables.is_empty() {
        return vec![Outcome::failed(TrackingError::EmptySelection.to_string())];
    }

    tables
        .iter()
        .map(|table_name| {
            let is_view = match tracker.database.is_view(db_name, table_name) {
                Ok(is_view) => is_view,
                Err(e) => {
                    warn!(table = %table_name, error = %e, "cannot inspect table");
                    return Outcome::failed(format!(
                        "Could not create version of {}.{}: {}",
                        db_name, table_name, e
                    ));
                }
            };
            create_version(tracker, db_name, table_name, version, tracking_set, is_view)
        })
        .collect()
}

fn try_change_tracking(
    tracker: &Tracker,
    key: &VersionKey,
    action: TrackingAction,
) -> TrackingResult<TrackingState> {
    let mut transition = None;

    let found = tracker.repository.modify_version(key, &mut |record| {
        let next = TrackingState::from_active(record.tracking_active).apply(action);
        let changed = match &next {
            Ok(state) => {
                record.tracking_active = state.records_statements();
                record.date_updated = now();
                true
            }
            Err(_) => false,
        };
        transition = Some(next);
        changed
    })?;

    match transition {
        Some(next) if found => Ok(next?),
        _ => Err(TrackingError::VersionNotFound(key.clone())),
    }
}

/// Activate or deactivate a version
#[instrument(skip(tracker))]
pub fn change_tracking(
    tracker: &Tracker,
    db_name: &str,
    table_name: &str,
    version: u32,
    action: TrackingAction,
) -> Outcome {
    let key = VersionKey::new(db_name, table_name, version);

    match try_change_tracking(tracker, &key, action) {
        Ok(state) => {
            info!(?state, "tracking state changed");
            let verb = if state.records_statements() {
                "activated"
            } else {
                "deactivated"
            };
            Outcome::ok(format!(
                "Tracking for {}.{} was {} at version {}.",
                db_name, table_name, verb, version
            ))
            .with_version(version)
        }
        Err(e) => {
            warn!(error = %e, "could not change tracking state");
            Outcome::failed(format!("Could not change tracking for {}: {}", key, e))
                .with_version(version)
        }
    }
}

fn try_delete_version(tracker: &Tracker, key: &VersionKey) -> TrackingResult<()> {
    let record = tracker
        .repository
        .get_version(key)?
        .ok_or_else(|| TrackingError::VersionNotFound(key.clone()))?;
    TrackingState::from_active(record.tracking_active).apply(TrackingAction::Delete)?;

    if !tracker.repository.delete_version(key)? {
        return Err(TrackingError::VersionNotFound(key.clone()));
    }
    Ok(())
}

/// Remove a version with its snapshot and both logs
#[instrument(skip(tracker))]
pub fn delete_version(tracker: &Tracker, db_name: &str, table_name: &str, version: u32) -> Outcome {
    let key = VersionKey::new(db_name, table_name, version);

    match try_delete_version(tracker, &key) {
        Ok(()) => {
            info!("tracking version deleted");
            Outcome::ok(format!(
                "Version {} of {}.{} was deleted.",
                version, db_name, table_name
            ))
            .with_version(version)
        }
        Err(e) => {
            warn!(error = %e, "could not delete tracking version");
            Outcome::failed(format!("Could not delete {}: {}", key, e)).with_version(version)
        }
    }
}

pub(crate) fn try_last_version_number(
    tracker: &Tracker,
    db_name: &str,
    table_name: &str,
) -> TrackingResult<Option<u32>> {
    let records = tracker.repository.list_versions(db_name, table_name)?;
    Ok(records.iter().map(|r| r.version).max())
}

/// Highest version number of a table, `None` when untracked
pub fn last_version_number(tracker: &Tracker, db_name: &str, table_name: &str) -> Option<u32> {
    try_last_version_number(tracker, db_name, table_name).unwrap_or_else(|e| {
        warn!(db = db_name, table = table_name, error = %e, "cannot read versions");
        None
    })
}

pub(crate) fn load_records(
    tracker: &Tracker,
    db_name: &str,
    table_name: &str,
) -> Vec<VersionRecord> {
    let mut records = tracker
        .repository
        .list_versions(db_name, table_name)
        .unwrap_or_else(|e| {
            warn!(db = db_name, table = table_name, error = %e, "cannot read versions");
            Vec::new()
        });
    records.sort_by(|a, b| b.version.cmp(&a.version));
    records
}

/// Versions of a table, newest first
pub fn list_versions(tracker: &Tracker, db_name: &str, table_name: &str) -> Vec<VersionSummary> {
    load_records(tracker, db_name, table_name)
        .iter()
        .map(VersionSummary::from)
        .collect()
}

/// Decoded version with snapshot and logs
pub fn get_version(
    tracker: &Tracker,
    db_name: &str,
    table_name: &str,
    version: u32,
) -> Option<TrackingVersion> {
    let key = VersionKey::new(db_name, table_name, version);
    match tracker.repository.get_version(&key) {
        Ok(record) => record.as_ref().map(TrackingVersion::from_record),
        Err(e) => {
            warn!(%key, error = %e, "cannot read version");
            None
        }
    }
}

/// Current lifecycle state of a version
pub fn state_of(tracker: &Tracker, db_name: &str, table_name: &str, version: u32) -> TrackingState {
    get_version(tracker, db_name, table_name, version)
        .map(|v| TrackingState::from_active(v.active))
        .unwrap_or(TrackingState::Untracked)
}
