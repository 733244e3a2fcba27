//! Exchange market-data payloads (Binance USDT-M futures REST)
//!
//! Field names follow the exchange's camelCase JSON. Numeric fields are
//! decoded with [`lenient_f64`](crate::parse::lenient_f64).

use crate::parse::{lenient_f64, parse_lenient_f64};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// `GET /fapi/v1/exchangeInfo` response (only the parts we read)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExchangeInfo {
    #[serde(default)]
    pub symbols: Vec<InstrumentInfo>,
}

/// One tradable contract as listed by the exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentInfo {
    pub symbol: String,
    #[serde(default)]
    pub quote_asset: String,
    #[serde(default)]
    pub contract_type: String,
    #[serde(default)]
    pub status: String,
}

impl InstrumentInfo {
    /// Universe membership: USDT-quoted perpetual that is currently trading
    pub fn is_usdt_perpetual(&self) -> bool {
        self.quote_asset == "USDT" && self.contract_type == "PERPETUAL" && self.status == "TRADING"
    }
}

/// `GET /fapi/v1/ticker/24hr` entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker24h {
    pub symbol: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub last_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quote_volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_change_percent: Option<f64>,
}

/// One time bucket of price/volume history (an Observation)
///
/// Price and volume fields are `None` when the exchange sent something
/// unparseable; consumers decide whether a gap is fatal for their window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Candle {
    pub open_time: i64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub close_time: i64,
}

impl Candle {
    /// Build from a kline array
    /// `[openTime, open, high, low, close, volume, closeTime, quoteVolume, ...]`
    ///
    /// Rows too short to carry a close are rejected.
    pub fn from_kline(row: &[Value]) -> Option<Self> {
        if row.len() <= 4 {
            return None;
        }

        let field = |idx: usize| row.get(idx).and_then(parse_lenient_f64);
        let time = |idx: usize| row.get(idx).and_then(Value::as_i64).unwrap_or_default();

        Some(Self {
            open_time: time(0),
            open: field(1),
            high: field(2),
            low: field(3),
            close: field(4),
            volume: field(5),
            close_time: time(6),
        })
    }

    /// Candle with only close and volume populated (test and fixture helper)
    pub fn with_close_volume(close: f64, volume: f64) -> Self {
        Self {
            close: Some(close),
            volume: Some(volume),
            ..Default::default()
        }
    }
}

impl<'de> Deserialize<'de> for Candle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let row = Vec::<Value>::deserialize(deserializer)?;
        Candle::from_kline(&row)
            .ok_or_else(|| serde::de::Error::custom(format!("kline row too short: {} fields", row.len())))
    }
}

/// `GET /fapi/v1/openInterest` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInterest {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub open_interest: Option<f64>,
}

/// `GET /fapi/v1/premiumIndex` response (mark price and funding)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumIndex {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub mark_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub last_funding_rate: Option<f64>,
}
