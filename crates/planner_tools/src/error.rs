//! Error types for the command-line tools.

use std::path::PathBuf;

use planner_core::PlanningError;
use thiserror::Error;

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors raised by the tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Parsing, validation or planning failed in the core.
    #[error(transparent)]
    Planning(#[from] PlanningError),

    /// Report serialization failed.
    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read a whole file, attaching the path to the error.
pub(crate) fn read_file(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })
}
