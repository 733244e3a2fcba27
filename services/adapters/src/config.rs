//! Configuration module for adapters
//!
//! One HTTP client (one connection pool) is shared by every collaborator in
//! a cycle; this module describes and builds it.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{AdapterError, Result};

/// HTTP client settings shared by all collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Idle connections are closed after this many seconds
    pub pool_idle_timeout_secs: u64,

    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,

    /// TCP keep-alive interval in seconds
    pub tcp_keepalive_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 12_000,
            pool_idle_timeout_secs: 90,
            pool_max_idle_per_host: 20,
            tcp_keepalive_secs: 60,
        }
    }
}

impl HttpClientConfig {
    /// Settings with the given request timeout and defaults otherwise
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            request_timeout_ms: timeout.as_millis() as u64,
            ..Default::default()
        }
    }

    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Build the pooled HTTP client
    pub fn build_client(&self) -> Result<reqwest::Client> {
        if self.request_timeout_ms == 0 {
            return Err(AdapterError::Configuration(
                "request timeout must be positive".to_string(),
            ));
        }

        reqwest::Client::builder()
            .timeout(self.request_timeout())
            .pool_idle_timeout(Duration::from_secs(self.pool_idle_timeout_secs))
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .tcp_keepalive(Duration::from_secs(self.tcp_keepalive_secs))
            .tcp_nodelay(true)
            .user_agent(concat!("movers-digest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AdapterError::Configuration(format!("Failed to create HTTP client: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_client_with_timeout() {
        let config = HttpClientConfig::with_timeout(Duration::from_secs(3));
        assert_eq!(config.request_timeout_ms, 3000);
        assert!(config.build_client().is_ok());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = HttpClientConfig {
            request_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.build_client().is_err());
    }
}
