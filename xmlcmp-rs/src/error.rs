//! Error types for xmlcmp.
//!
//! Differences between documents are data, not errors: they are returned in an
//! [`AggregateDiff`](crate::compare::AggregateDiff). The variants below cover
//! caller mistakes and unreadable input.

use thiserror::Error;

/// Result type alias for xmlcmp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or running a comparison.
#[derive(Error, Debug)]
pub enum Error {
    /// XML parsing error.
    #[error("XML parse error: {0}")]
    Parse(String),

    /// Invalid comparison settings, e.g. a malformed tolerance path or a key
    /// expression registered on a model that does not support them.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A key expression that cannot be parsed.
    #[error("Illegal key expression '{expression}': {reason}")]
    InvalidKeyExpression { expression: String, reason: String },

    /// Two documents that were required to be equal are not.
    #[error("{report}")]
    Mismatch { count: usize, report: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML error from quick-xml.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}
