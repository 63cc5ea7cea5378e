//! Error types for mediatrim.

use std::io;
use thiserror::Error;

/// Result type for mediatrim operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for mediatrim operations.
///
/// Structurally odd container content is deliberately not represented here:
/// a file the walker cannot fully parse produces a [`crate::ScanResult`]
/// describing the unparsed region, not an error.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// File prefix matches none of the recognized container signatures.
    #[error("Unsupported container format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Create an unsupported-format error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }
}
