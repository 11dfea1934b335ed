//! Error types for Flowcast.
//!
//! This module provides a unified error handling approach using `thiserror`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Flowcast operations.
pub type Result<T> = std::result::Result<T, FlowcastError>;

/// Errors that can occur in Flowcast.
#[derive(Debug, Error)]
pub enum FlowcastError {
    /// A required request parameter is missing or malformed.
    #[error("Request input faulty: {0}")]
    InvalidInput(String),

    /// No cycle, no matching files, or reach id absent.
    #[error("{0}")]
    NotFound(String),

    /// File lacks the expected variable or has an unexpected rank.
    #[error("Invalid forecast file {path}: {reason}")]
    FileFormat { path: PathBuf, reason: String },

    /// Every member of a cycle was skipped.
    #[error("No usable forecast members ({skipped} skipped): {reason}")]
    PartialFailure { skipped: usize, reason: String },

    /// Failed to read a file or directory.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read NetCDF data.
    #[error("NetCDF error: {0}")]
    NetCDF(String),
}

impl FlowcastError {
    /// Create an Io error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a FileFormat error.
    pub fn file_format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FileFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a NotFound error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<netcdf::Error> for FlowcastError {
    fn from(err: netcdf::Error) -> Self {
        Self::NetCDF(err.to_string())
    }
}
