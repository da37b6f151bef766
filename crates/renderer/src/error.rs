//! Error types for stick-plot rendering.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while rendering a stick plot.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Nothing to draw; no file is written.
    #[error("no depth groups to render")]
    Skipped,

    /// A palette entry is not a recognised colour.
    #[error("invalid colour '{0}'")]
    InvalidColor(String),

    /// Figure dimensions or palette size are unusable.
    #[error("invalid style: {0}")]
    InvalidStyle(String),

    /// The embedded font could not be loaded.
    #[error("font error: {0}")]
    Font(String),

    /// PNG encoding or canvas allocation failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Writing the output file failed.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
