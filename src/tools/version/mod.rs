//! Version lifecycle tools

mod change_tracking;
mod create_version;
mod delete_version;
mod list_versions;

pub use change_tracking::ChangeTrackingTool;
pub use create_version::CreateVersionTool;
pub use delete_version::DeleteVersionTool;
pub use list_versions::ListVersionsTool;
