//! Error types for dataset loading.

use thiserror::Error;

use adcp_common::TimeParseError;

/// Errors that can occur while loading or decoding a dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The store is unreachable, or the data needed for a plot is missing.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// The time coordinate could not be decoded.
    #[error("invalid time coordinate: {0}")]
    InvalidTime(String),

    /// Array metadata is missing or inconsistent.
    #[error("invalid variable metadata: {0}")]
    InvalidMetadata(String),

    /// A read against the array store failed.
    #[error("failed to read '{name}': {reason}")]
    ReadFailed { name: String, reason: String },

    /// Storage backend error (connection, listing, key lookup).
    #[error("storage error: {0}")]
    Storage(String),
}

impl DatasetError {
    /// Create a DataUnavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::DataUnavailable(msg.into())
    }

    /// Create an InvalidMetadata error.
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }

    /// Create a ReadFailed error.
    pub fn read_failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ReadFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a Storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

impl From<TimeParseError> for DatasetError {
    fn from(err: TimeParseError) -> Self {
        Self::InvalidTime(err.to_string())
    }
}

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;
