//! Error types for shared type conversions

use thiserror::Error;

/// Errors raised when converting raw labels into typed values
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypeError {
    /// Bucket label outside `{SHORT_UP, SHORT_DOWN, LONG_UP, LONG_DOWN}`
    #[error("Unknown bucket label: '{0}'")]
    UnknownBucket(String),
}
