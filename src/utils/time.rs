//! Time and timestamp utilities
//!
//! Log entries and version records carry second-precision local timestamps,
//! persisted as `YYYY-MM-DD HH:MM:SS` strings.

use chrono::{Local, NaiveDateTime, Timelike};

/// Point in time attached to log entries and version records
pub type Timestamp = NaiveDateTime;

/// Format used for every persisted date string
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time, truncated to whole seconds
pub fn now() -> Timestamp {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Parse a persisted date string
pub fn parse_date(value: &str) -> Option<Timestamp> {
    NaiveDateTime::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Render a timestamp as a persisted date string
pub fn format_date(ts: &Timestamp) -> String {
    ts.format(DATE_FORMAT).to_string()
}

/// Get current user from the OS environment
pub fn get_current_user() -> String {
    use std::env;

    env::var("USER") // Linux/Mac
        .or_else(|_| env::var("USERNAME")) // Windows
        .unwrap_or_else(|_| "anonymous".to_string())
}

/// Serde adapter storing a [`Timestamp`] as a `DATE_FORMAT` string
pub mod date_format {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{format_date, parse_date, Timestamp};

    pub fn serialize<S>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_date(ts))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date string '{}'", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format_round_trip() {
        let ts = parse_date("2024-03-01 12:30:05").unwrap();
        assert_eq!(format_date(&ts), "2024-03-01 12:30:05");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_date("yesterday").is_none());
        assert!(parse_date("2024-13-01 00:00:00").is_none());
    }

    #[test]
    fn test_now_has_no_subsecond_part() {
        assert_eq!(now().nanosecond(), 0);
    }
}
