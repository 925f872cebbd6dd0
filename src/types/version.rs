//! Tracking versions
//!
//! `VersionRecord` is the persisted row, with snapshot and logs kept as
//! opaque encoded blobs. `TrackingVersion` is the decoded form the engine
//! works with.

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::utils::time::{self, Timestamp};

use super::{next_entry_id, LogEntry, LogKind, SchemaSnapshot, TrackingSet};

/// Identity of a version: database, table, version number
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionKey {
    pub db_name: String,
    pub table_name: String,
    pub version: u32,
}

impl VersionKey {
    pub fn new(db_name: &str, table_name: &str, version: u32) -> Self {
        Self {
            db_name: db_name.to_string(),
            table_name: table_name.to_string(),
            version,
        }
    }
}

impl std::fmt::Display for VersionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{} v{}", self.db_name, self.table_name, self.version)
    }
}

/// Persisted shape of a version, one record per version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub db_name: String,
    pub table_name: String,
    pub version: u32,
    #[serde(with = "time::date_format")]
    pub date_created: Timestamp,
    #[serde(with = "time::date_format")]
    pub date_updated: Timestamp,
    #[serde(default)]
    pub schema_snapshot: String,
    #[serde(default)]
    pub ddlog: String,
    #[serde(default)]
    pub dmlog: String,
    #[serde(default)]
    pub tracking: String,
    #[serde(default)]
    pub tracking_active: bool,
    /// Lowest DDL entry id never handed out
    #[serde(default)]
    pub next_ddl_id: u64,
    /// Lowest DML entry id never handed out
    #[serde(default)]
    pub next_dml_id: u64,
}

impl VersionRecord {
    pub fn key(&self) -> VersionKey {
        VersionKey::new(&self.db_name, &self.table_name, self.version)
    }

    pub fn log_blob(&self, kind: LogKind) -> &str {
        match kind {
            LogKind::Ddl => &self.ddlog,
            LogKind::Dml => &self.dmlog,
        }
    }

    pub fn log_blob_mut(&mut self, kind: LogKind) -> &mut String {
        match kind {
            LogKind::Ddl => &mut self.ddlog,
            LogKind::Dml => &mut self.dmlog,
        }
    }

    fn high_water_mut(&mut self, kind: LogKind) -> &mut u64 {
        match kind {
            LogKind::Ddl => &mut self.next_ddl_id,
            LogKind::Dml => &mut self.next_dml_id,
        }
    }

    /// Raise the stored high-water mark of `kind` above every id in its log
    ///
    /// Records written before the mark existed start at 0.
    pub fn settle_entry_ids(&mut self, kind: LogKind) -> u64 {
        let in_log = next_entry_id(&codec::log::decode(self.log_blob(kind)));
        let mark = self.high_water_mut(kind);
        *mark = (*mark).max(in_log);
        *mark
    }

    /// Hand out the next entry id of `kind`; an id is never handed out twice
    pub fn allocate_entry_id(&mut self, kind: LogKind) -> u64 {
        let id = self.settle_entry_ids(kind);
        *self.high_water_mut(kind) = id + 1;
        id
    }
}

/// Decoded version with its snapshot and both logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingVersion {
    pub db_name: String,
    pub table_name: String,
    pub version: u32,
    pub date_created: Timestamp,
    pub date_updated: Timestamp,
    pub tracking_set: TrackingSet,
    pub active: bool,
    pub snapshot: SchemaSnapshot,
    pub ddlog: Vec<LogEntry>,
    pub dmlog: Vec<LogEntry>,
}

impl TrackingVersion {
    /// Decode a persisted record
    ///
    /// Corrupt blobs decode to empty structures instead of failing.
    pub fn from_record(record: &VersionRecord) -> Self {
        Self {
            db_name: record.db_name.clone(),
            table_name: record.table_name.clone(),
            version: record.version,
            date_created: record.date_created,
            date_updated: record.date_updated,
            tracking_set: TrackingSet::parse(&record.tracking),
            active: record.tracking_active,
            snapshot: codec::snapshot::decode(&record.schema_snapshot),
            ddlog: codec::log::decode(&record.ddlog),
            dmlog: codec::log::decode(&record.dmlog),
        }
    }

    /// Encode back into the persisted shape
    pub fn to_record(&self) -> VersionRecord {
        VersionRecord {
            db_name: self.db_name.clone(),
            table_name: self.table_name.clone(),
            version: self.version,
            date_created: self.date_created,
            date_updated: self.date_updated,
            schema_snapshot: codec::snapshot::encode(&self.snapshot),
            ddlog: codec::log::encode(&self.ddlog),
            dmlog: codec::log::encode(&self.dmlog),
            tracking: self.tracking_set.to_string(),
            tracking_active: self.active,
            next_ddl_id: next_entry_id(&self.ddlog),
            next_dml_id: next_entry_id(&self.dmlog),
        }
    }

    pub fn key(&self) -> VersionKey {
        VersionKey::new(&self.db_name, &self.table_name, self.version)
    }

    pub fn log(&self, kind: LogKind) -> &[LogEntry] {
        match kind {
            LogKind::Ddl => &self.ddlog,
            LogKind::Dml => &self.dmlog,
        }
    }
}

/// Version metadata without snapshot or logs, for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionSummary {
    pub db_name: String,
    pub table_name: String,
    pub version: u32,
    #[serde(with = "time::date_format")]
    pub date_created: Timestamp,
    #[serde(with = "time::date_format")]
    pub date_updated: Timestamp,
    pub tracking: String,
    pub tracking_active: bool,
}

impl From<&VersionRecord> for VersionSummary {
    fn from(record: &VersionRecord) -> Self {
        Self {
            db_name: record.db_name.clone(),
            table_name: record.table_name.clone(),
            version: record.version,
            date_created: record.date_created,
            date_updated: record.date_updated,
            tracking: record.tracking.clone(),
            tracking_active: record.tracking_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnDescriptor, StatementKind};
    use crate::utils::time::parse_date;

    fn sample_version() -> TrackingVersion {
        let ts = parse_date("2024-05-01 10:00:00").unwrap();
        TrackingVersion {
            db_name: "shop".to_string(),
            table_name: "orders".to_string(),
            version: 2,
            date_created: ts,
            date_updated: ts,
            tracking_set: TrackingSet::from_kinds([StatementKind::Insert]),
            active: true,
            snapshot: SchemaSnapshot::new(vec![ColumnDescriptor::new("id", "int(11)")], vec![]),
            ddlog: vec![],
            dmlog: vec![LogEntry::new(
                0,
                ts,
                "alice".to_string(),
                "INSERT INTO orders VALUES (1)".to_string(),
            )],
        }
    }

    #[test]
    fn test_record_conversion_keeps_everything() {
        let version = sample_version();
        let record = version.to_record();

        assert_eq!(record.tracking, "INSERT");
        assert!(record.tracking_active);
        assert_eq!(TrackingVersion::from_record(&record), version);
    }

    #[test]
    fn test_corrupt_blobs_decode_to_empty() {
        let mut record = sample_version().to_record();
        record.schema_snapshot = "a:2:{s:7:\"COLUMNS\";".to_string();
        record.dmlog = "not a log".to_string();

        let version = TrackingVersion::from_record(&record);
        assert!(version.snapshot.is_empty());
        assert!(version.dmlog.is_empty());
    }

    #[test]
    fn test_entry_ids_are_never_handed_out_twice() {
        let mut record = sample_version().to_record();
        assert_eq!(record.next_dml_id, 1);

        assert_eq!(record.allocate_entry_id(LogKind::Dml), 1);
        // entry 1 is not in the log, its id stays used
        assert_eq!(codec::log::decode(&record.dmlog).len(), 1);
        assert_eq!(record.allocate_entry_id(LogKind::Dml), 2);
        assert_eq!(record.allocate_entry_id(LogKind::Ddl), 0);
    }

    #[test]
    fn test_records_without_high_water_mark_continue_after_log() {
        let mut record = sample_version().to_record();
        record.next_dml_id = 0;
        let json = serde_json::to_string(&record).unwrap().replace(",\"next_dml_id\":0", "");

        let mut legacy: VersionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(legacy.next_dml_id, 0);
        assert_eq!(legacy.allocate_entry_id(LogKind::Dml), 1);
    }

    #[test]
    fn test_summary_from_record() {
        let record = sample_version().to_record();
        let summary = VersionSummary::from(&record);
        assert_eq!(summary.version, 2);
        assert_eq!(summary.tracking, "INSERT");
    }
}
