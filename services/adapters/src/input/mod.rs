//! Input adapters for collecting market data from the exchange

pub mod collectors;

use crate::Result;
use async_trait::async_trait;
use movers_types::{Candle, InstrumentInfo, OpenInterest, PremiumIndex, Ticker24h};

pub use collectors::BinanceFuturesClient;

/// Candle interval requested from the exchange (one-hour buckets)
pub const CANDLE_INTERVAL: &str = "1h";

/// Market-data collaborator consumed by the digest pipeline
///
/// Implementations must be cheap to share across concurrent tasks; each call
/// is an independent request that may fail on its own.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// All listed contracts, unfiltered
    async fn list_instruments(&self) -> Result<Vec<InstrumentInfo>>;

    /// 24h ticker snapshot for every contract
    async fn all_tickers(&self) -> Result<Vec<Ticker24h>>;

    /// Most recent `limit` one-hour candles, oldest first
    async fn recent_candles(&self, symbol: &str, limit: usize) -> Result<Vec<Candle>>;

    /// Current open interest
    async fn open_interest(&self, symbol: &str) -> Result<OpenInterest>;

    /// Mark price and last funding rate
    async fn premium_index(&self, symbol: &str) -> Result<PremiumIndex>;
}
