//! Error types for the adapters module

use thiserror::Error;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Longest response body excerpt kept in an error
const BODY_EXCERPT_CHARS: usize = 200;

/// Main error type for adapter operations
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Transport-level failure (DNS, connect, TLS, reset)
    #[error("Request to {endpoint} failed: {source}")]
    Http {
        /// Logical endpoint name (never includes credentials)
        endpoint: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// Request exceeded the configured timeout
    #[error("Request to {endpoint} timed out after {timeout_ms}ms")]
    Timeout {
        /// Logical endpoint name
        endpoint: String,
        /// Configured timeout in milliseconds
        timeout_ms: u64,
    },

    /// Remote answered with a non-success status
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        /// Logical endpoint name
        endpoint: String,
        /// HTTP status code
        status: u16,
        /// Leading part of the response body
        body: String,
    },

    /// Response body did not match the expected schema
    #[error("Failed to decode {endpoint} response: {error}")]
    Decode {
        /// Logical endpoint name
        endpoint: String,
        /// Decoder message
        error: String,
    },

    /// Remote reported failure inside a 2xx envelope (`{"ok": false}`)
    #[error("{endpoint} rejected the request: {description}")]
    Rejected {
        /// Logical endpoint name
        endpoint: String,
        /// Description supplied by the remote
        description: String,
    },

    /// Base URL or path could not be joined into a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Collaborator is not configured (missing credentials)
    #[error("{0} is not configured")]
    Disabled(String),

    /// Configuration error in adapter settings
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AdapterError {
    /// Classify a client error, separating timeouts from other transport failures
    pub fn from_reqwest(endpoint: &str, error: reqwest::Error, timeout_ms: u64) -> Self {
        if error.is_timeout() {
            AdapterError::Timeout {
                endpoint: endpoint.to_string(),
                timeout_ms,
            }
        } else {
            AdapterError::Http {
                endpoint: endpoint.to_string(),
                source: error,
            }
        }
    }

    /// Build a status error keeping only a short excerpt of the body
    pub fn status(endpoint: &str, status: u16, body: &str) -> Self {
        AdapterError::Status {
            endpoint: endpoint.to_string(),
            status,
            body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
        }
    }

    /// Build a decode error
    pub fn decode(endpoint: &str, error: impl std::fmt::Display) -> Self {
        AdapterError::Decode {
            endpoint: endpoint.to_string(),
            error: error.to_string(),
        }
    }

    /// Check if this error is transient and the next attempt may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            AdapterError::Http { .. } | AdapterError::Timeout { .. } => true,
            AdapterError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Drop the request URL from a transport error
    ///
    /// Used by collaborators whose URL embeds a credential.
    pub fn without_url(self) -> Self {
        match self {
            AdapterError::Http { endpoint, source } => AdapterError::Http {
                endpoint,
                source: source.without_url(),
            },
            other => other,
        }
    }

    /// Check if this error indicates a permanent misconfiguration
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            AdapterError::Disabled(_) | AdapterError::Configuration(_) | AdapterError::InvalidUrl(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(AdapterError::status("klines", 429, "slow down").is_recoverable());
        assert!(AdapterError::status("klines", 503, "").is_recoverable());
        assert!(!AdapterError::status("klines", 400, "bad symbol").is_recoverable());
        assert!(AdapterError::Timeout { endpoint: "x".into(), timeout_ms: 1 }.is_recoverable());
    }

    #[test]
    fn test_status_body_is_truncated() {
        let body = "x".repeat(1000);
        match AdapterError::status("exchangeInfo", 500, &body) {
            AdapterError::Status { body, .. } => assert_eq!(body.len(), 200),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_permanent_errors() {
        assert!(AdapterError::Disabled("annotator".into()).is_permanent());
        assert!(!AdapterError::decode("ticker", "eof").is_permanent());
    }
}
