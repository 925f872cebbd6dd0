//! JSON lines file repository
//!
//! Every record is one line of `tracking.jsonl`. The whole file is
//! rewritten atomically after each mutation; the in-memory map is only
//! updated once the write succeeded.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::types::{VersionKey, VersionRecord};
use crate::utils::{atomic_write, remove_temp_file};

use super::{StoreError, StoreResult, TrackingRepository};

/// Repository persisted to a JSON lines file
#[derive(Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
    records: Mutex<BTreeMap<VersionKey, VersionRecord>>,
}

impl JsonFileRepository {
    /// Open (or start) the repository at `path`
    ///
    /// Lines that cannot be parsed are skipped with a warning. A `.tmp`
    /// sibling left by an interrupted write is removed; other files next to
    /// `path` are left alone.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if remove_temp_file(&path)? {
            warn!(path = %path.display(), "removed leftover of an interrupted write");
        }

        let records = Self::load(&path)?;
        info!(path = %path.display(), versions = records.len(), "opened tracking repository");

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> StoreResult<BTreeMap<VersionKey, VersionRecord>> {
        let mut records = BTreeMap::new();

        if !path.exists() {
            return Ok(records);
        }

        let content = fs::read_to_string(path)?;
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<VersionRecord>(line) {
                Ok(record) => {
                    records.insert(record.key(), record);
                }
                Err(e) => warn!(line = line_num + 1, error = %e, "skipping unreadable version record"),
            }
        }

        Ok(records)
    }

    fn persist(&self, records: &BTreeMap<VersionKey, VersionRecord>) -> StoreResult<()> {
        let mut content = String::new();
        for record in records.values() {
            content.push_str(&serde_json::to_string(record)?);
            content.push('\n');
        }

        atomic_write(&self.path, &content)?;
        debug!(path = %self.path.display(), versions = records.len(), "persisted tracking repository");
        Ok(())
    }

    /// Apply `change` to a copy of the records, persist, then commit
    fn mutate<T, F>(&self, change: F) -> StoreResult<T>
    where
        F: FnOnce(&mut BTreeMap<VersionKey, VersionRecord>) -> StoreResult<(T, bool)>,
    {
        let mut records = self.records.lock();
        let mut next = records.clone();

        let (result, changed) = change(&mut next)?;
        if changed {
            self.persist(&next)?;
            *records = next;
        }

        Ok(result)
    }
}

impl TrackingRepository for JsonFileRepository {
    fn insert_version(&self, record: VersionRecord) -> StoreResult<()> {
        self.mutate(|records| {
            let key = record.key();
            if records.contains_key(&key) {
                return Err(StoreError::AlreadyExists(key));
            }
            records.insert(key, record);
            Ok(((), true))
        })
    }

    fn get_version(&self, key: &VersionKey) -> StoreResult<Option<VersionRecord>> {
        Ok(self.records.lock().get(key).cloned())
    }

    fn list_versions(&self, db_name: &str, table_name: &str) -> StoreResult<Vec<VersionRecord>> {
        Ok(self
            .records
            .lock()
            .values()
            .filter(|r| r.db_name == db_name && r.table_name == table_name)
            .cloned()
            .collect())
    }

    fn list_tracked_tables(&self, db_name: &str) -> StoreResult<Vec<String>> {
        let tables: BTreeSet<String> = self
            .records
            .lock()
            .keys()
            .filter(|k| k.db_name == db_name)
            .map(|k| k.table_name.clone())
            .collect();
        Ok(tables.into_iter().collect())
    }

    fn modify_version(
        &self,
        key: &VersionKey,
        change: &mut dyn FnMut(&mut VersionRecord) -> bool,
    ) -> StoreResult<bool> {
        self.mutate(|records| match records.get_mut(key) {
            Some(existing) => Ok((true, change(existing))),
            None => Ok((false, false)),
        })
    }

    fn delete_version(&self, key: &VersionKey) -> StoreResult<bool> {
        self.mutate(|records| {
            let removed = records.remove(key).is_some();
            Ok((removed, removed))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::time::parse_date;
    use tempfile::TempDir;

    fn record(table: &str, version: u32) -> VersionRecord {
        let ts = parse_date("2024-06-01 08:00:00").unwrap();
        VersionRecord {
            db_name: "shop".to_string(),
            table_name: table.to_string(),
            version,
            date_created: ts,
            date_updated: ts,
            schema_snapshot: String::new(),
            ddlog: String::new(),
            dmlog: String::new(),
            tracking: "INSERT".to_string(),
            tracking_active: true,
            next_ddl_id: 0,
            next_dml_id: 0,
        }
    }

    #[test]
    fn test_records_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tracking.jsonl");

        {
            let repo = JsonFileRepository::open(&path).unwrap();
            repo.insert_version(record("orders", 1)).unwrap();
            repo.insert_version(record("orders", 2)).unwrap();
            repo.delete_version(&VersionKey::new("shop", "orders", 1)).unwrap();
        }

        let repo = JsonFileRepository::open(&path).unwrap();
        let versions = repo.list_versions("shop", "orders").unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].version, 2);
    }

    #[test]
    fn test_unreadable_lines_are_skipped_on_open() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tracking.jsonl");
        let good = serde_json::to_string(&record("orders", 1)).unwrap();
        fs::write(&path, format!("{{broken\n{}\n", good)).unwrap();

        let repo = JsonFileRepository::open(&path).unwrap();
        assert_eq!(repo.list_versions("shop", "orders").unwrap().len(), 1);
    }

    #[test]
    fn test_leftover_temp_file_is_removed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tracking.jsonl");
        fs::write(path.with_extension("tmp"), "partial").unwrap();

        JsonFileRepository::open(&path).unwrap();
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_unrelated_temp_files_are_kept() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tracking.jsonl");
        let unrelated = temp_dir.path().join("someone_else.tmp");
        fs::write(&unrelated, "not ours").unwrap();

        JsonFileRepository::open(&path).unwrap();
        assert_eq!(fs::read_to_string(&unrelated).unwrap(), "not ours");
    }

    #[test]
    fn test_unchanged_modify_does_not_persist() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tracking.jsonl");
        let repo = JsonFileRepository::open(&path).unwrap();
        repo.insert_version(record("orders", 1)).unwrap();
        fs::remove_file(&path).unwrap();

        let key = VersionKey::new("shop", "orders", 1);
        assert!(repo.modify_version(&key, &mut |_| false).unwrap());
        assert!(!path.exists());

        assert!(repo
            .modify_version(&key, &mut |r| {
                r.tracking_active = false;
                true
            })
            .unwrap());
        assert!(path.exists());
    }
}
