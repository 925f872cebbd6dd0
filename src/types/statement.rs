//! Statement kinds and tracking sets
//!
//! A version observes only the statement kinds in its tracking set. The set
//! is persisted as a comma-separated list of tokens such as
//! `ALTER TABLE,INSERT,DROP VIEW`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::LogKind;

/// Kinds of statements a version can observe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatementKind {
    AlterTable,
    RenameTable,
    CreateTable,
    DropTable,
    AlterView,
    CreateView,
    DropView,
    CreateIndex,
    DropIndex,
    Insert,
    Update,
    Delete,
    Truncate,
}

impl StatementKind {
    /// Every kind, in the canonical order used when formatting tracking sets
    pub const ALL: [StatementKind; 13] = [
        StatementKind::AlterTable,
        StatementKind::RenameTable,
        StatementKind::CreateTable,
        StatementKind::DropTable,
        StatementKind::AlterView,
        StatementKind::CreateView,
        StatementKind::DropView,
        StatementKind::CreateIndex,
        StatementKind::DropIndex,
        StatementKind::Insert,
        StatementKind::Update,
        StatementKind::Delete,
        StatementKind::Truncate,
    ];

    /// Persisted token
    pub fn token(&self) -> &'static str {
        match self {
            StatementKind::AlterTable => "ALTER TABLE",
            StatementKind::RenameTable => "RENAME TABLE",
            StatementKind::CreateTable => "CREATE TABLE",
            StatementKind::DropTable => "DROP TABLE",
            StatementKind::AlterView => "ALTER VIEW",
            StatementKind::CreateView => "CREATE VIEW",
            StatementKind::DropView => "DROP VIEW",
            StatementKind::CreateIndex => "CREATE INDEX",
            StatementKind::DropIndex => "DROP INDEX",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
            StatementKind::Truncate => "TRUNCATE",
        }
    }

    /// Which log a statement of this kind is written to
    pub fn log_kind(&self) -> LogKind {
        match self {
            StatementKind::Insert
            | StatementKind::Update
            | StatementKind::Delete
            | StatementKind::Truncate => LogKind::Dml,
            _ => LogKind::Ddl,
        }
    }

    /// Classify a statement by its leading keywords
    ///
    /// This only looks at the verb and the object keyword (`TABLE`, `VIEW`,
    /// `INDEX`); the statement is not parsed or validated. Modifiers between
    /// the two (`CREATE TEMPORARY TABLE`, `CREATE UNIQUE INDEX`,
    /// `CREATE OR REPLACE VIEW`) are skipped.
    pub fn classify(statement: &str) -> Option<StatementKind> {
        let words: Vec<String> = strip_leading_comments(statement)
            .split_whitespace()
            .take(8)
            .map(|w| {
                w.trim_end_matches(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                    .to_ascii_uppercase()
            })
            .collect();

        let verb = words.first()?.as_str();
        let object = || {
            words
                .iter()
                .skip(1)
                .find(|w| matches!(w.as_str(), "TABLE" | "VIEW" | "INDEX"))
                .map(String::as_str)
        };

        match verb {
            "INSERT" => Some(StatementKind::Insert),
            "UPDATE" => Some(StatementKind::Update),
            "DELETE" => Some(StatementKind::Delete),
            "TRUNCATE" => Some(StatementKind::Truncate),
            "RENAME" => match object() {
                Some("TABLE") => Some(StatementKind::RenameTable),
                _ => None,
            },
            "ALTER" => match object() {
                Some("TABLE") => Some(StatementKind::AlterTable),
                Some("VIEW") => Some(StatementKind::AlterView),
                _ => None,
            },
            "CREATE" => match object() {
                Some("TABLE") => Some(StatementKind::CreateTable),
                Some("VIEW") => Some(StatementKind::CreateView),
                Some("INDEX") => Some(StatementKind::CreateIndex),
                _ => None,
            },
            "DROP" => match object() {
                Some("TABLE") => Some(StatementKind::DropTable),
                Some("VIEW") => Some(StatementKind::DropView),
                Some("INDEX") => Some(StatementKind::DropIndex),
                _ => None,
            },
            _ => None,
        }
    }
}

fn strip_leading_comments(mut sql: &str) -> &str {
    loop {
        sql = sql.trim_start();
        if let Some(rest) = sql.strip_prefix("/*") {
            match rest.find("*/") {
                Some(end) => sql = &rest[end + 2..],
                None => return "",
            }
        } else if sql.starts_with("--") || sql.starts_with('#') {
            match sql.find('\n') {
                Some(end) => sql = &sql[end + 1..],
                None => return "",
            }
        } else {
            return sql;
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for StatementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        StatementKind::ALL
            .iter()
            .copied()
            .find(|k| k.token().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| format!("unknown statement kind '{}'", s.trim()))
    }
}

/// Ordered set of statement kinds observed by a version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingSet {
    kinds: Vec<StatementKind>,
}

impl TrackingSet {
    /// Tracking set with every statement kind
    pub fn all() -> Self {
        Self::from_kinds(StatementKind::ALL)
    }

    /// Build a set, deduplicated and kept in canonical order
    pub fn from_kinds<I: IntoIterator<Item = StatementKind>>(kinds: I) -> Self {
        let mut kinds: Vec<StatementKind> = kinds.into_iter().collect();
        kinds.sort();
        kinds.dedup();
        Self { kinds }
    }

    /// Parse a comma-separated token list
    ///
    /// Unknown tokens are dropped.
    pub fn parse(tokens: &str) -> Self {
        Self::from_kinds(
            tokens
                .split(',')
                .filter(|t| !t.trim().is_empty())
                .filter_map(|t| t.parse().ok()),
        )
    }

    pub fn contains(&self, kind: StatementKind) -> bool {
        self.kinds.binary_search(&kind).is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatementKind> {
        self.kinds.iter()
    }
}

impl fmt::Display for TrackingSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<&str> = self.kinds.iter().map(|k| k.token()).collect();
        f.write_str(&tokens.join(","))
    }
}

impl Serialize for TrackingSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TrackingSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(TrackingSet::parse(&raw))
    }
}
