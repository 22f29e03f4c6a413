//! Error types for parsing wire data.

use thiserror::Error;

/// Errors that can occur when parsing values received from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A device type tag was not recognized.
    #[error("Unknown device type: {0}")]
    UnknownDeviceType(String),

    /// A composite device id did not decompose as `<type>-<number>`.
    #[error("Invalid device id: {0}")]
    InvalidDeviceId(String),

    /// A field held a value outside its valid range.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Result type alias for parse operations.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
