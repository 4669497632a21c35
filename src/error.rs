// Engine error types
// Every fallible operation runs on the control thread; the render path has no error type

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Source file missing, unreadable, undecodable or empty
    #[error("failed to open {}: {reason}", .path.display())]
    OpenFailed { path: PathBuf, reason: String },

    /// Output device unavailable or stream format negotiation failed
    #[error("failed to start audio engine: {0}")]
    EngineStartFailed(String),
}

impl EngineError {
    pub(crate) fn open_failed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::OpenFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn start_failed(reason: impl ToString) -> Self {
        Self::EngineStartFailed(reason.to_string())
    }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
