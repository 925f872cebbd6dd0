//! Status + message pairs returned by mutating operations

use serde::Serialize;

/// Result of a mutating operation as seen by the caller
///
/// Failures never escape as errors past the engine boundary; they are
/// reported here with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
    /// Version the operation applied to, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

impl Outcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            version: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }
}
