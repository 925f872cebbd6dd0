//! Blob codecs for persisted version records
//!
//! - `snapshot`: structure snapshot as a JSON document
//! - `log`: DDL/DML logs as JSON lines, one entry per line
//!
//! Both decoders are lenient. Version records are historical data that may
//! predate the current encoding, so anything unreadable degrades to an
//! empty structure (or a skipped line) instead of failing the caller.

pub mod log;
pub mod snapshot;
