//! Report and export types
//!
//! Plain data handed to rendering and export consumers.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::utils::time::{self, Timestamp};

use super::{LogEntry, LogKind};

/// Token in a user filter that matches every user
pub const ANY_USER: &str = "*";

/// Which logs a report draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogType {
    Schema,
    Data,
    #[default]
    SchemaAndData,
}

impl LogType {
    /// Whether the DDL log is selected
    pub fn includes_schema(&self) -> bool {
        matches!(self, LogType::Schema | LogType::SchemaAndData)
    }

    /// Whether the DML log is selected
    pub fn includes_data(&self) -> bool {
        matches!(self, LogType::Data | LogType::SchemaAndData)
    }
}

impl FromStr for LogType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "schema" => Ok(LogType::Schema),
            "data" => Ok(LogType::Data),
            "schema_and_data" => Ok(LogType::SchemaAndData),
            other => Err(format!("unknown log type '{}'", other)),
        }
    }
}

/// Set of usernames a report is restricted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFilter {
    users: BTreeSet<String>,
}

impl UserFilter {
    /// Filter matching every user
    pub fn any() -> Self {
        Self::from_users([ANY_USER])
    }

    pub fn from_users<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            users: users.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma-separated user list such as `alice, bob`
    ///
    /// An empty list matches every user.
    pub fn parse(users: &str) -> Self {
        let filter = Self::from_users(
            users
                .split(',')
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
        );
        if filter.users.is_empty() {
            Self::any()
        } else {
            filter
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.users.contains(ANY_USER)
    }

    pub fn matches(&self, username: &str) -> bool {
        self.is_wildcard() || self.users.contains(username)
    }
}

impl Default for UserFilter {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for UserFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let users: Vec<&str> = self.users.iter().map(String::as_str).collect();
        f.write_str(&users.join(","))
    }
}

impl Serialize for UserFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for UserFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(UserFilter::parse(&raw))
    }
}

/// Everything needed to build a report, passed explicitly
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub db_name: String,
    pub table_name: String,
    pub version: u32,
    pub log_type: LogType,
    pub users: UserFilter,
    /// Defaults to the version's creation date
    pub date_from: Option<Timestamp>,
    /// Defaults to now
    pub date_to: Option<Timestamp>,
}

impl ReportRequest {
    /// Report over both logs, every user, the whole lifetime of the version
    pub fn new(db_name: &str, table_name: &str, version: u32) -> Self {
        Self {
            db_name: db_name.to_string(),
            table_name: table_name.to_string(),
            version,
            log_type: LogType::default(),
            users: UserFilter::any(),
            date_from: None,
            date_to: None,
        }
    }

    pub fn with_log_type(mut self, log_type: LogType) -> Self {
        self.log_type = log_type;
        self
    }

    pub fn with_users(mut self, users: UserFilter) -> Self {
        self.users = users;
        self
    }

    pub fn with_window(mut self, from: Option<Timestamp>, to: Option<Timestamp>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }
}

/// An entry as placed in a report section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLine {
    /// Running line number across the DDL then DML sections
    pub line_number: usize,
    pub log: LogKind,
    #[serde(flatten)]
    pub entry: LogEntry,
}

/// Structured tracking report
#[derive(Debug, Clone, Serialize)]
pub struct TrackingReport {
    pub db_name: String,
    pub table_name: String,
    pub version: u32,
    pub tracking: String,
    pub tracking_active: bool,
    pub log_type: LogType,
    pub users: UserFilter,
    #[serde(with = "time::date_format")]
    pub date_from: Timestamp,
    #[serde(with = "time::date_format")]
    pub date_to: Timestamp,
    /// Filtered DDL entries in log order
    pub ddl: Vec<ReportLine>,
    /// Filtered DML entries in log order
    pub dml: Vec<ReportLine>,
    /// Selected logs merged and sorted for export
    pub entries: Vec<LogEntry>,
    /// Both logs of the version are empty
    pub no_data: bool,
}

/// How recorded statements are exported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportMode {
    /// Downloadable `.sql` file
    #[default]
    Dump,
    /// Script that replays into a scratch database
    Script,
    /// Re-execute the statements against the database
    Execute,
}

impl FromStr for ExportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dump" => Ok(ExportMode::Dump),
            "script" => Ok(ExportMode::Script),
            "execute" => Ok(ExportMode::Execute),
            other => Err(format!("unknown export mode '{}'", other)),
        }
    }
}

/// Downloadable dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpFile {
    pub filename: String,
    pub dump: String,
}

/// What to do when a replayed statement fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPolicy {
    /// Run every statement, collecting failures
    #[default]
    ContinueOnError,
    /// Stop at the first failing statement
    FailFast,
}

/// A statement that failed during replay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementFailure {
    pub entry_id: u64,
    pub statement: String,
    pub error: String,
}

/// Result of replaying entries against the database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionSummary {
    /// Statements that ran successfully
    pub executed: usize,
    pub failures: Vec<StatementFailure>,
    /// Statements not attempted because of `FailFast`
    pub skipped: usize,
}

impl ExecutionSummary {
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_type_selection() {
        assert!(LogType::Schema.includes_schema());
        assert!(!LogType::Schema.includes_data());
        assert!(!LogType::Data.includes_schema());
        assert!(LogType::Data.includes_data());
        assert!(LogType::SchemaAndData.includes_schema());
        assert!(LogType::SchemaAndData.includes_data());
    }

    #[test]
    fn test_log_type_parse() {
        assert_eq!("schema_and_data".parse::<LogType>().unwrap(), LogType::SchemaAndData);
        assert!("both".parse::<LogType>().is_err());
    }

    #[test]
    fn test_user_filter_parse() {
        let filter = UserFilter::parse(" alice , bob,");
        assert!(filter.matches("alice"));
        assert!(filter.matches("bob"));
        assert!(!filter.matches("carol"));
        assert_eq!(filter.to_string(), "alice,bob");
    }

    #[test]
    fn test_user_filter_wildcard() {
        assert!(UserFilter::parse("*").matches("anyone"));
        assert!(UserFilter::parse("alice,*").matches("carol"));
        assert!(UserFilter::parse("").is_wildcard());
    }
}
