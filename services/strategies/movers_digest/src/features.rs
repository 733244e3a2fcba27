//! Per-instrument momentum features over the trailing hourly window

use movers_types::Candle;
use serde::{Deserialize, Serialize};

/// Candles required to compute any feature
pub const FEATURE_WINDOW: usize = 25;

/// Buckets spanned by the short return (12h)
pub const SHORT_LOOKBACK: usize = 12;

/// Buckets spanned by the long return (24h)
pub const LONG_LOOKBACK: usize = 24;

/// Buckets averaged for the volume baseline
pub const VOLUME_BASELINE: usize = 12;

/// Momentum snapshot of one instrument
///
/// Every numeric field is finite or `None`. `None` on a return axis excludes
/// the instrument from that axis's ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub symbol: String,
    pub ret_short: Option<f64>,
    pub ret_long: Option<f64>,
    pub vol_ratio: Option<f64>,
    pub price: Option<f64>,
}

impl FeatureRecord {
    /// Record with every feature absent
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ret_short: None,
            ret_long: None,
            vol_ratio: None,
            price: None,
        }
    }
}

/// Compute features from recent candles, oldest first
///
/// Only the last [`FEATURE_WINDOW`] candles are used. A shorter history
/// yields [`FeatureRecord::empty`].
pub fn compute_features(symbol: &str, candles: &[Candle]) -> FeatureRecord {
    if candles.len() < FEATURE_WINDOW {
        return FeatureRecord::empty(symbol);
    }

    let window = &candles[candles.len() - FEATURE_WINDOW..];
    let closes: Vec<Option<f64>> = window.iter().map(|c| c.close).collect();
    let volumes: Vec<Option<f64>> = window.iter().map(|c| c.volume).collect();

    FeatureRecord {
        symbol: symbol.to_string(),
        ret_short: trailing_return(&closes, SHORT_LOOKBACK),
        ret_long: trailing_return(&closes, LONG_LOOKBACK),
        vol_ratio: volume_ratio(&volumes),
        price: closes.last().copied().flatten().filter(|p| p.is_finite()),
    }
}

/// Percentage return from `lookback` buckets ago to the last bucket
///
/// `None` when either endpoint is missing or zero.
pub fn trailing_return(closes: &[Option<f64>], lookback: usize) -> Option<f64> {
    if closes.len() < lookback + 1 {
        return None;
    }

    let last = closes[closes.len() - 1]?;
    let base = closes[closes.len() - 1 - lookback]?;
    if last == 0.0 || base == 0.0 {
        return None;
    }

    finite((last / base - 1.0) * 100.0)
}

/// Last volume over the mean of the preceding [`VOLUME_BASELINE`] volumes
///
/// `None` when fewer than 13 samples exist, any of them is missing, or the
/// baseline mean is zero.
pub fn volume_ratio(volumes: &[Option<f64>]) -> Option<f64> {
    if volumes.len() < VOLUME_BASELINE + 1 {
        return None;
    }

    let tail = &volumes[volumes.len() - VOLUME_BASELINE - 1..];
    let (current, baseline) = tail.split_last()?;
    let current = (*current)?;

    let sum = baseline.iter().copied().sum::<Option<f64>>()?;
    let mean = sum / VOLUME_BASELINE as f64;
    if mean <= 0.0 {
        return None;
    }

    finite(current / mean)
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
