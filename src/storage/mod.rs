//! Storage collaborators
//!
//! The engine talks to two collaborators:
//! - [`TrackingRepository`]: persists one [`VersionRecord`] per version
//! - [`Database`]: the tracked database itself (structure, execution)
//!
//! ```text
//! ┌─────────┐   records   ┌────────────────────┐
//! │ Tracker │────────────►│ TrackingRepository │  memory / JSONL file
//! │         │             └────────────────────┘
//! │         │  structure  ┌────────────────────┐
//! │         │────────────►│ Database           │  catalog / real DBMS
//! └─────────┘  execute    └────────────────────┘
//! ```

mod catalog;
mod database;
mod file;
mod memory;

pub use catalog::{CatalogDatabase, TableDefinition};
pub use database::{Database, DatabaseError, DatabaseResult, TableNode, TABLE_GROUP_SEPARATOR};
pub use file::JsonFileRepository;
pub use memory::MemoryRepository;

use crate::types::{VersionKey, VersionRecord};

/// Result type for repository operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by repositories
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("version {0} already exists")]
    AlreadyExists(VersionKey),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl From<crate::utils::AtomicError> for StoreError {
    fn from(e: crate::utils::AtomicError) -> Self {
        match e {
            crate::utils::AtomicError::Io(io) => StoreError::Io(io),
        }
    }
}

/// Persistence of version records
///
/// Implementations must:
/// - keep at most one record per (database, table, version)
/// - store blobs verbatim, never reinterpreting them
/// - run each `modify_version` atomically with respect to other writers
///
/// Ordering of returned records is unspecified; the engine sorts.
pub trait TrackingRepository: Send + Sync {
    /// Insert a new record, failing if the version already exists
    fn insert_version(&self, record: VersionRecord) -> StoreResult<()>;

    /// Fetch one record
    fn get_version(&self, key: &VersionKey) -> StoreResult<Option<VersionRecord>>;

    /// All records of a table
    fn list_versions(&self, db_name: &str, table_name: &str) -> StoreResult<Vec<VersionRecord>>;

    /// Names of tables of `db_name` with at least one version
    fn list_tracked_tables(&self, db_name: &str) -> StoreResult<Vec<String>>;

    /// Read-modify-write one record under the repository's write lock
    ///
    /// `change` returns whether it modified the record; only then is the
    /// record stored. Returns `false` if the record does not exist.
    fn modify_version(
        &self,
        key: &VersionKey,
        change: &mut dyn FnMut(&mut VersionRecord) -> bool,
    ) -> StoreResult<bool>;

    /// Remove a record. Returns `false` if it does not exist.
    fn delete_version(&self, key: &VersionKey) -> StoreResult<bool>;
}
