//! Utility functions and helpers
//!
//! Timestamp helpers and atomic file writes.

pub mod atomic;
pub mod time;

pub use atomic::{atomic_write, remove_temp_file, AtomicError, AtomicResult};
pub use time::{format_date, get_current_user, now, parse_date, Timestamp, DATE_FORMAT};
