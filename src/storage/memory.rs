//! In-memory repository

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::RwLock;

use crate::types::{VersionKey, VersionRecord};

use super::{StoreError, StoreResult, TrackingRepository};

/// Repository keeping every record in memory
#[derive(Debug, Default)]
pub struct MemoryRepository {
    records: RwLock<BTreeMap<VersionKey, VersionRecord>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored versions across all tables
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl TrackingRepository for MemoryRepository {
    fn insert_version(&self, record: VersionRecord) -> StoreResult<()> {
        let mut records = self.records.write();
        let key = record.key();
        if records.contains_key(&key) {
            return Err(StoreError::AlreadyExists(key));
        }
        records.insert(key, record);
        Ok(())
    }

    fn get_version(&self, key: &VersionKey) -> StoreResult<Option<VersionRecord>> {
        Ok(self.records.read().get(key).cloned())
    }

    fn list_versions(&self, db_name: &str, table_name: &str) -> StoreResult<Vec<VersionRecord>> {
        Ok(self
            .records
            .read()
            .values()
            .filter(|r| r.db_name == db_name && r.table_name == table_name)
            .cloned()
            .collect())
    }

    fn list_tracked_tables(&self, db_name: &str) -> StoreResult<Vec<String>> {
        let tables: BTreeSet<String> = self
            .records
            .read()
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
        let mut records = self.records.write();
        let Some(existing) = records.get_mut(key) else {
            return Ok(false);
        };

        let mut next = existing.clone();
        if change(&mut next) {
            *existing = next;
        }
        Ok(true)
    }

    fn delete_version(&self, key: &VersionKey) -> StoreResult<bool> {
        Ok(self.records.write().remove(key).is_some())
    }
}
