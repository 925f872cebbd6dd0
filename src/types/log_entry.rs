//! Log entries
//!
//! Each version owns two append-only logs: the DDL log for structural
//! statements and the DML log for data statements. Entries are immutable
//! once written; they are only appended or removed as a whole.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::time::{self, Timestamp};

/// Which of a version's two logs an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// Data definition statements (`ddlog`)
    Ddl,
    /// Data manipulation statements (`dmlog`)
    Dml,
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogKind::Ddl => write!(f, "DDL"),
            LogKind::Dml => write!(f, "DML"),
        }
    }
}

/// A single recorded statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Position assigned at append time; never renumbered
    pub id: u64,

    /// When the statement was recorded
    #[serde(rename = "date", with = "time::date_format")]
    pub timestamp: Timestamp,

    /// Who executed the statement
    pub username: String,

    /// Statement text; never altered once recorded
    pub statement: String,
}

impl LogEntry {
    pub fn new(id: u64, timestamp: Timestamp, username: String, statement: String) -> Self {
        Self {
            id,
            timestamp,
            username,
            statement,
        }
    }

    /// Total order used by reports: timestamp, id, username, statement
    pub fn sort_key(&self) -> (Timestamp, u64, &str, &str) {
        (self.timestamp, self.id, &self.username, &self.statement)
    }
}

/// One past the highest id in `log`
///
/// Only a lower bound for the next id: the version record also keeps a
/// high-water mark, so a deleted highest id is not handed out again.
pub fn next_entry_id(log: &[LogEntry]) -> u64 {
    log.iter().map(|e| e.id + 1).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::time::parse_date;

    fn entry(id: u64, date: &str) -> LogEntry {
        LogEntry::new(
            id,
            parse_date(date).unwrap(),
            "root".to_string(),
            "INSERT INTO t VALUES (1)".to_string(),
        )
    }

    #[test]
    fn test_entry_serializes_date_string() {
        let json = serde_json::to_string(&entry(3, "2024-01-02 03:04:05")).unwrap();
        assert!(json.contains("\"id\":3"));
        assert!(json.contains("\"date\":\"2024-01-02 03:04:05\""));
    }

    #[test]
    fn test_next_entry_id_is_past_highest_id() {
        assert_eq!(next_entry_id(&[]), 0);

        let log = vec![entry(0, "2024-01-01 00:00:00"), entry(3, "2024-01-01 00:00:01")];
        assert_eq!(next_entry_id(&log), 4);
    }

    #[test]
    fn test_log_kind_display() {
        assert_eq!(LogKind::Ddl.to_string(), "DDL");
        assert_eq!(LogKind::Dml.to_string(), "DML");
    }
}
