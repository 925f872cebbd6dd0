//! Log filtering and ordering

use crate::types::{LogEntry, LogType, UserFilter};
use crate::utils::time::Timestamp;

/// Entries recorded within `[from, to]` by a user the filter matches
///
/// Input order is preserved and ids are left untouched.
pub fn filter(
    entries: &[LogEntry],
    users: &UserFilter,
    from: Timestamp,
    to: Timestamp,
) -> Vec<LogEntry> {
    entries
        .iter()
        .filter(|e| e.timestamp >= from && e.timestamp <= to && users.matches(&e.username))
        .cloned()
        .collect()
}

/// Filter the logs selected by `log_type` and merge them
///
/// The DDL log is selected for `schema` and `schema_and_data` whether or
/// not it is empty. The result is sorted by (timestamp, id, username,
/// statement), so equal inputs always produce the same sequence.
pub fn get_entries(
    ddlog: &[LogEntry],
    dmlog: &[LogEntry],
    log_type: LogType,
    users: &UserFilter,
    from: Timestamp,
    to: Timestamp,
) -> Vec<LogEntry> {
    let mut entries = Vec::new();
    if log_type.includes_schema() {
        entries.extend(filter(ddlog, users, from, to));
    }
    if log_type.includes_data() {
        entries.extend(filter(dmlog, users, from, to));
    }

    entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    entries
}
