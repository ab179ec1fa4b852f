//! Error types for CutLab.

use thiserror::Error;

/// Main error type for CutLab operations outside the pure edit engine.
#[derive(Error, Debug)]
pub enum CutlabError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Revision conflict for {project}: expected {expected}, found {found}")]
    Conflict {
        project: String,
        expected: u64,
        found: u64,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for CutLab operations.
pub type Result<T> = std::result::Result<T, CutlabError>;
