//! Error types for the flat-file decorator.

use thiserror::Error;

/// Errors that can occur while decorating a flat-file.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A malformed line or row was found while reading input data.
    #[error("{0}")]
    Parse(String),

    /// A record cannot take the requested annotations without corrupting its layout.
    /// Raised before any line of the record is changed.
    #[error("structural error: {0}")]
    Structural(String),

    /// Input files are individually well-formed but inconsistent with each other.
    #[error("{0}")]
    Validation(String),
}
