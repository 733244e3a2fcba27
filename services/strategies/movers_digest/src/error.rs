//! Error types for the movers digest

use adapter_service::AdapterError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigestError {
    #[error("Market data error ({context}): {source}")]
    MarketData {
        context: String,
        #[source]
        source: AdapterError,
    },

    #[error("Delivery failed: {0}")]
    Delivery(#[source] AdapterError),

    #[error("State file {path:?}: {source}")]
    StateIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("State encoding error: {0}")]
    StateEncoding(#[from] serde_json::Error),

    #[error("No tradable USDT perpetual instruments in the universe")]
    EmptyUniverse,

    #[error("No instrument has enough history to rank")]
    NothingToRank,
}

impl DigestError {
    pub fn market_data(context: impl Into<String>, source: AdapterError) -> Self {
        DigestError::MarketData {
            context: context.into(),
            source,
        }
    }

    pub fn state_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DigestError::StateIo {
            path: path.into(),
            source,
        }
    }

    /// Failure that will repeat every cycle until the configuration changes
    pub fn is_permanent(&self) -> bool {
        match self {
            DigestError::MarketData { source, .. } | DigestError::Delivery(source) => {
                source.is_permanent()
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, DigestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permanent_follows_adapter_error() {
        let disabled = DigestError::Delivery(AdapterError::Disabled("telegram".into()));
        assert!(disabled.is_permanent());

        let outage = DigestError::market_data("24h tickers", AdapterError::status("ticker/24hr", 503, ""));
        assert!(!outage.is_permanent());
        assert!(!DigestError::NothingToRank.is_permanent());
    }
}
