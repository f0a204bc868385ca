use crate::jtop::JtopError;
use serde_json::{json, Value};
use thiserror::Error;

/// Top-level failure taxonomy for one snapshot run. Rendered messages are
/// wire-compatible with the long-standing output format, so consumers keyed
/// on the `JtopException:` / `Unexpected error:` prefixes keep working.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The monitoring backend is reachable but reports not-ready.
    #[error("jtop is not ok (service might not be running)")]
    NotReady,

    /// The backend's own error type surfaced during any phase.
    #[error("JtopException: {0}")]
    Backend(String),

    /// Anything else.
    #[error("Unexpected error: {0}")]
    Internal(String),
}

impl SnapshotError {
    /// The single-key error mapping emitted instead of a snapshot.
    pub fn to_value(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

impl From<JtopError> for SnapshotError {
    fn from(e: JtopError) -> Self {
        SnapshotError::Backend(e.to_string())
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(e: serde_json::Error) -> Self {
        SnapshotError::Internal(e.to_string())
    }
}

impl From<anyhow::Error> for SnapshotError {
    fn from(e: anyhow::Error) -> Self {
        SnapshotError::Internal(format!("{e:#}"))
    }
}
