//! Structure snapshot codec

use tracing::warn;

use crate::types::SchemaSnapshot;

/// Encode a snapshot into its persisted blob
pub fn encode(snapshot: &SchemaSnapshot) -> String {
    serde_json::to_string(snapshot).unwrap_or_else(|e| {
        warn!(error = %e, "failed to encode structure snapshot, storing an empty one");
        String::new()
    })
}

/// Decode a persisted blob
///
/// Never fails: an empty or unreadable blob yields an empty snapshot.
pub fn decode(blob: &str) -> SchemaSnapshot {
    if blob.trim().is_empty() {
        return SchemaSnapshot::default();
    }

    match serde_json::from_str::<SchemaSnapshot>(blob) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(error = %e, "unreadable structure snapshot, using an empty one");
            SchemaSnapshot::default()
        }
    }
}
