//! Tracking engine
//!
//! [`Tracker`] owns the two collaborators and exposes every engine
//! operation. The operations themselves live in submodules as free
//! functions taking the tracker:
//!
//! - `versions`: version lifecycle (create, toggle, delete, listings)
//! - `record`: the statement recording hook and log entry deletion
//! - `filter`: user/time filtering and deterministic ordering
//! - `report`: tracking reports and snapshot views
//! - `export`: dump, temp-database script and re-execution
//! - `tables`: tracked/untracked table overviews
//!
//! Mutating operations never return an error to the caller. Failures are
//! logged and reported through [`Outcome`].

mod export;
mod filter;
mod record;
mod report;
mod state;
mod tables;
mod versions;

pub use export::{
    build_dump, build_script, download_info, execute, is_untracked_statement, untracked,
    NOTRACK_MARKER, TEMP_DB_HEADER,
};
pub use filter::{filter, get_entries};
pub use record::RecordOutcome;
pub use report::{build_report, snapshot_view};
pub use state::{StateError, TrackingAction, TrackingState};
pub use tables::extract_table_names;

use std::sync::Arc;

use crate::config::TrackerConfig;
use crate::storage::{
    CatalogDatabase, Database, DatabaseError, JsonFileRepository, StoreError, TrackingRepository,
};
use crate::types::{
    DumpFile, ExecutionPolicy, ExecutionSummary, Outcome, ReportRequest, SnapshotView,
    TrackingReport, TrackingSet, TrackingVersion, VersionKey, VersionSummary,
};
use crate::utils::time::get_current_user;

/// Result type for engine operations
pub type TrackingResult<T> = Result<T, TrackingError>;

/// Errors raised inside the engine
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("version {0} not found")]
    VersionNotFound(VersionKey),

    #[error("version {requested} of {db_name}.{table_name} must be greater than {latest}")]
    VersionNotIncreasing {
        db_name: String,
        table_name: String,
        requested: u32,
        latest: u32,
    },

    #[error("version numbers start at 1")]
    InvalidVersion,

    #[error(transparent)]
    IllegalTransition(#[from] StateError),

    #[error("no tables selected")]
    EmptySelection,
}

/// The tracking engine
pub struct Tracker {
    pub(crate) repository: Arc<dyn TrackingRepository>,
    pub(crate) database: Arc<dyn Database>,
    pub(crate) config: TrackerConfig,
    pub(crate) current_user: String,
}

impl Tracker {
    /// Create a tracker over the given collaborators
    pub fn new(
        repository: Arc<dyn TrackingRepository>,
        database: Arc<dyn Database>,
        config: TrackerConfig,
    ) -> Self {
        // Detect current user once at startup
        let current_user = get_current_user();

        Self {
            repository,
            database,
            config,
            current_user,
        }
    }

    /// Open the file repository and catalog database named by `config`
    pub fn from_config(config: TrackerConfig) -> TrackingResult<Self> {
        let repository = JsonFileRepository::open(config.versions_path())?;

        let mut database = match &config.catalog_path {
            Some(path) => CatalogDatabase::from_file(path)?,
            None => CatalogDatabase::new(),
        };
        if let Some(path) = &config.replay_path {
            database = database.with_replay_file(path)?;
        }

        Ok(Self::new(Arc::new(repository), Arc::new(database), config))
    }

    /// Override the user recorded by version creation
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.current_user = user.into();
        self
    }

    pub fn current_user(&self) -> &str {
        &self.current_user
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn database(&self) -> &dyn Database {
        self.database.as_ref()
    }

    pub fn repository(&self) -> &dyn TrackingRepository {
        self.repository.as_ref()
    }
}

// Operations are implemented in the submodules
impl Tracker {
    // Version lifecycle (from versions.rs)
    pub fn create_version(
        &self,
        db_name: &str,
        table_name: &str,
        version: Option<u32>,
        tracking_set: Option<&TrackingSet>,
        is_view: bool,
    ) -> Outcome {
        versions::create_version(self, db_name, table_name, version, tracking_set, is_view)
    }

    pub fn create_for_multiple_tables(
        &self,
        db_name: &str,
        tables: &[String],
        version: Option<u32>,
        tracking_set: Option<&TrackingSet>,
    ) -> Vec<Outcome> {
        versions::create_for_multiple_tables(self, db_name, tables, version, tracking_set)
    }

    pub fn activate(&self, db_name: &str, table_name: &str, version: u32) -> Outcome {
        versions::change_tracking(self, db_name, table_name, version, TrackingAction::Activate)
    }

    pub fn deactivate(&self, db_name: &str, table_name: &str, version: u32) -> Outcome {
        versions::change_tracking(self, db_name, table_name, version, TrackingAction::Deactivate)
    }

    pub fn delete_version(&self, db_name: &str, table_name: &str, version: u32) -> Outcome {
        versions::delete_version(self, db_name, table_name, version)
    }

    pub fn last_version_number(&self, db_name: &str, table_name: &str) -> Option<u32> {
        versions::last_version_number(self, db_name, table_name)
    }

    pub fn list_versions(&self, db_name: &str, table_name: &str) -> Vec<VersionSummary> {
        versions::list_versions(self, db_name, table_name)
    }

    pub fn get_version(
        &self,
        db_name: &str,
        table_name: &str,
        version: u32,
    ) -> Option<TrackingVersion> {
        versions::get_version(self, db_name, table_name, version)
    }

    pub fn state_of(&self, db_name: &str, table_name: &str, version: u32) -> TrackingState {
        versions::state_of(self, db_name, table_name, version)
    }

    // Statement recording (from record.rs)
    pub fn record_statement(
        &self,
        db_name: &str,
        table_name: &str,
        statement: &str,
        username: &str,
    ) -> RecordOutcome {
        record::record_statement(self, db_name, table_name, statement, username)
    }

    pub fn delete_log_entries(
        &self,
        db_name: &str,
        table_name: &str,
        version: u32,
        ddl_id: Option<u64>,
        dml_id: Option<u64>,
    ) -> Vec<Outcome> {
        record::delete_log_entries(self, db_name, table_name, version, ddl_id, dml_id)
    }

    // Reports (from report.rs)
    pub fn build_report(&self, request: &ReportRequest) -> Option<TrackingReport> {
        report::report_for(self, request)
    }

    pub fn schema_snapshot(
        &self,
        db_name: &str,
        table_name: &str,
        version: u32,
    ) -> Option<SnapshotView> {
        report::schema_snapshot(self, db_name, table_name, version)
    }

    // Export (from export.rs)
    pub fn export_dump(&self, request: &ReportRequest) -> Option<DumpFile> {
        export::export_dump(self, request)
    }

    pub fn export_script(&self, request: &ReportRequest) -> Option<String> {
        export::export_script(self, request)
    }

    pub fn execute_log(
        &self,
        request: &ReportRequest,
        policy: ExecutionPolicy,
    ) -> Option<ExecutionSummary> {
        export::execute_log(self, request, policy)
    }

    // Table overviews (from tables.rs)
    pub fn tracked_tables(&self, db_name: &str) -> Vec<VersionSummary> {
        tables::tracked_tables(self, db_name)
    }

    pub fn untracked_tables(&self, db_name: &str) -> Vec<String> {
        tables::untracked_tables(self, db_name)
    }
}
