//! Log tools

mod delete_log_entries;
mod record_statement;

pub use delete_log_entries::DeleteLogEntriesTool;
pub use record_statement::RecordStatementTool;
