//! Binance USDT-M futures REST collector
//!
//! Read-only public endpoints, no authentication:
//!
//! | call                 | endpoint                 |
//! |----------------------|--------------------------|
//! | `list_instruments`   | `GET /fapi/v1/exchangeInfo` |
//! | `all_tickers`        | `GET /fapi/v1/ticker/24hr`  |
//! | `recent_candles`     | `GET /fapi/v1/klines`       |
//! | `open_interest`      | `GET /fapi/v1/openInterest` |
//! | `premium_index`      | `GET /fapi/v1/premiumIndex` |
//!
//! Each request holds a [`RequestPermit`](crate::rate_limit::RequestPermit)
//! for its whole round trip and records its outcome on the limiter's tracker.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use movers_types::{Candle, ExchangeInfo, InstrumentInfo, OpenInterest, PremiumIndex, Ticker24h};

use crate::common::{endpoint_url, send_json};
use crate::input::{MarketData, CANDLE_INTERVAL};
use crate::rate_limit::RequestLimiter;
use crate::Result;

const EXCHANGE_INFO_PATH: &str = "/fapi/v1/exchangeInfo";
const TICKER_24H_PATH: &str = "/fapi/v1/ticker/24hr";
const KLINES_PATH: &str = "/fapi/v1/klines";
const OPEN_INTEREST_PATH: &str = "/fapi/v1/openInterest";
const PREMIUM_INDEX_PATH: &str = "/fapi/v1/premiumIndex";

/// REST client for the futures market-data endpoints
#[derive(Clone)]
pub struct BinanceFuturesClient {
    http: reqwest::Client,
    base_url: String,
    limiter: RequestLimiter,
    timeout_ms: u64,
}

impl BinanceFuturesClient {
    /// Create a client sharing the given connection pool and limiter
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        limiter: RequestLimiter,
        timeout_ms: u64,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            limiter,
            timeout_ms,
        }
    }

    /// Limiter shared with this client
    pub fn limiter(&self) -> &RequestLimiter {
        &self.limiter
    }

    async fn get<T>(&self, endpoint: &str, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = endpoint_url(&self.base_url, path)?;
        let _permit = self.limiter.acquire().await?;

        let request = self.http.get(url).query(query);
        let outcome = send_json(endpoint, request, self.timeout_ms).await;
        self.limiter.tracker().record(&outcome);
        outcome
    }
}

#[async_trait]
impl MarketData for BinanceFuturesClient {
    async fn list_instruments(&self) -> Result<Vec<InstrumentInfo>> {
        let info: ExchangeInfo = self.get("exchangeInfo", EXCHANGE_INFO_PATH, &[]).await?;
        debug!(count = info.symbols.len(), "Fetched exchange instruments");
        Ok(info.symbols)
    }

    async fn all_tickers(&self) -> Result<Vec<Ticker24h>> {
        self.get("ticker/24hr", TICKER_24H_PATH, &[]).await
    }

    async fn recent_candles(&self, symbol: &str, limit: usize) -> Result<Vec<Candle>> {
        let query = [
            ("symbol", symbol.to_string()),
            ("interval", CANDLE_INTERVAL.to_string()),
            ("limit", limit.to_string()),
        ];
        let rows: Vec<Vec<Value>> = self.get("klines", KLINES_PATH, &query).await?;

        let total = rows.len();
        let candles: Vec<Candle> = rows.iter().filter_map(|row| Candle::from_kline(row)).collect();
        if candles.len() != total {
            debug!(symbol, dropped = total - candles.len(), "Skipped malformed kline rows");
        }
        Ok(candles)
    }

    async fn open_interest(&self, symbol: &str) -> Result<OpenInterest> {
        self.get("openInterest", OPEN_INTEREST_PATH, &[("symbol", symbol.to_string())])
            .await
    }

    async fn premium_index(&self, symbol: &str) -> Result<PremiumIndex> {
        self.get("premiumIndex", PREMIUM_INDEX_PATH, &[("symbol", symbol.to_string())])
            .await
    }
}
