//! Log codec: one JSON-encoded [`LogEntry`] per line

use tracing::warn;

use crate::types::LogEntry;

/// Encode a log into its persisted blob
pub fn encode(entries: &[LogEntry]) -> String {
    let mut blob = String::new();

    for entry in entries {
        match serde_json::to_string(entry) {
            Ok(line) => {
                blob.push_str(&line);
                blob.push('\n');
            }
            Err(e) => warn!(id = entry.id, error = %e, "failed to encode log entry, dropping it"),
        }
    }

    blob
}

/// Decode a persisted blob
///
/// Lines that cannot be read are skipped; the rest of the log is kept.
pub fn decode(blob: &str) -> Vec<LogEntry> {
    let mut entries = Vec::new();

    for (line_num, line) in blob.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<LogEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!(line = line_num + 1, error = %e, "skipping unreadable log entry");
            }
        }
    }

    entries
}

/// Append one entry to a persisted blob, leaving existing lines untouched
pub fn append(blob: &mut String, entry: &LogEntry) -> serde_json::Result<()> {
    let line = serde_json::to_string(entry)?;
    if !blob.is_empty() && !blob.ends_with('\n') {
        blob.push('\n');
    }
    blob.push_str(&line);
    blob.push('\n');
    Ok(())
}

/// Blob without the entries carrying `id`, or `None` if there are none
///
/// Every other line is kept verbatim, including lines that cannot be read.
pub fn remove(blob: &str, id: u64) -> Option<String> {
    let mut removed = false;
    let kept: String = blob
        .split_inclusive('\n')
        .filter(|line| {
            let matches = serde_json::from_str::<LogEntry>(line.trim())
                .map(|entry| entry.id == id)
                .unwrap_or(false);
            removed |= matches;
            !matches
        })
        .collect();

    removed.then_some(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::time::parse_date;

    fn entry(id: u64, user: &str, statement: &str) -> LogEntry {
        LogEntry::new(
            id,
            parse_date("2024-02-29 23:59:59").unwrap(),
            user.to_string(),
            statement.to_string(),
        )
    }

    #[test]
    fn test_statements_survive_verbatim() {
        let entries = vec![
            entry(0, "root", "DROP TABLE IF EXISTS `t`;\n"),
            entry(1, "root", "CREATE TABLE `t` (\n  `id` int\n);\n"),
            entry(4, "bob", "UPDATE t SET note = 'line1\nline2'"),
        ];

        let blob = encode(&entries);
        assert_eq!(blob.lines().count(), 3);
        assert_eq!(decode(&blob), entries);
    }

    #[test]
    fn test_unreadable_lines_are_skipped() {
        let good = encode(&[entry(0, "alice", "INSERT INTO t VALUES (1)")]);
        let blob = format!("{}# log 2024-01-01 00:00:00 root\n{{\"id\": \"x\"}}\n\n", good);

        let decoded = decode(&blob);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].username, "alice");
    }

    #[test]
    fn test_append_and_remove_keep_unreadable_lines() {
        let mut blob = "LEGACY-LINE".to_string();
        append(&mut blob, &entry(0, "alice", "INSERT INTO t VALUES (1)")).unwrap();
        append(&mut blob, &entry(1, "bob", "DELETE FROM t")).unwrap();
        assert!(blob.starts_with("LEGACY-LINE\n"));
        assert_eq!(decode(&blob).len(), 2);

        let trimmed = remove(&blob, 0).unwrap();
        assert!(trimmed.starts_with("LEGACY-LINE\n"));
        assert_eq!(decode(&trimmed), vec![entry(1, "bob", "DELETE FROM t")]);

        assert_eq!(remove(&trimmed, 7), None);
    }

    #[test]
    fn test_empty_blob() {
        assert!(decode("").is_empty());
        assert_eq!(encode(&[]), "");
    }
}
