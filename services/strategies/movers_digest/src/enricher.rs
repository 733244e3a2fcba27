//! Enrichment of selected picks with indicators and derivatives metrics

use adapter_service::MarketData;
use movers_types::{AnnotationInput, Bucket, Ticker24h};
use serde::Serialize;

use crate::error::{DigestError, Result};
use crate::indicators::{ema, rsi};
use crate::selector::Pick;

/// Window and indicator periods used during enrichment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichSettings {
    /// Hourly candles fetched for the indicators
    pub window: usize,
    pub ema_period: usize,
    pub rsi_period: usize,
}

impl Default for EnrichSettings {
    fn default() -> Self {
        Self {
            window: 200,
            ema_period: 50,
            rsi_period: 14,
        }
    }
}

/// A pick with everything the report shows about it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    pub bucket: Bucket,
    pub symbol: String,
    pub ret_short: Option<f64>,
    pub ret_long: Option<f64>,
    pub vol_ratio: Option<f64>,
    pub price: Option<f64>,
    pub quote_volume: Option<f64>,
    pub pct_change_24h: Option<f64>,
    pub ema_long: Option<f64>,
    pub rsi: Option<f64>,
    pub open_interest: Option<f64>,
    pub oi_change_pct: Option<f64>,
    pub funding_rate: Option<f64>,
    pub mark_price: Option<f64>,
}

impl EnrichedRecord {
    /// Distance of price above (positive) or below the long EMA
    pub fn price_vs_ema_long(&self) -> Option<f64> {
        Some(self.price? - self.ema_long?)
    }

    /// Numeric snapshot sent to the annotation service
    pub fn annotation_input(&self) -> AnnotationInput {
        AnnotationInput {
            symbol: self.symbol.clone(),
            bucket: self.bucket,
            ret_short: self.ret_short,
            ret_long: self.ret_long,
            vol_ratio: self.vol_ratio,
            quote_vol: self.quote_volume,
            oi: self.open_interest,
            oi_chg_pct: self.oi_change_pct,
            funding: self.funding_rate,
            rsi: self.rsi,
            price_vs_ema_long: self.price_vs_ema_long(),
        }
    }
}

/// Percentage change of open interest against the previous cycle
///
/// `None` without a previous observation or when it is not positive.
pub fn oi_change_pct(oi: Option<f64>, prev_oi: Option<f64>) -> Option<f64> {
    let (oi, prev) = (oi?, prev_oi?);
    if prev <= 0.0 {
        return None;
    }
    let change = (oi / prev - 1.0) * 100.0;
    change.is_finite().then_some(change)
}

/// Enrich one pick
///
/// Fetches the extended candle window, open interest and premium index
/// concurrently. Any failed request fails the whole pick. `ticker` comes
/// from the cycle's bulk snapshot and `prev_oi` from the persisted state;
/// the caller records the returned `open_interest`.
pub async fn enrich<M>(
    market: &M,
    pick: &Pick,
    ticker: Option<&Ticker24h>,
    prev_oi: Option<f64>,
    settings: &EnrichSettings,
) -> Result<EnrichedRecord>
where
    M: MarketData + ?Sized,
{
    let symbol = pick.symbol();

    let (candles, open_interest, premium) = futures::try_join!(
        market.recent_candles(symbol, settings.window),
        market.open_interest(symbol),
        market.premium_index(symbol),
    )
    .map_err(|e| DigestError::market_data(format!("enrich {}", symbol), e))?;

    let closes: Vec<f64> = candles.iter().filter_map(|c| c.close).collect();

    let price = ticker
        .and_then(|t| t.last_price)
        .filter(|p| *p != 0.0)
        .or_else(|| closes.last().copied())
        .or(pick.record.price);

    let oi = open_interest.open_interest;

    Ok(EnrichedRecord {
        bucket: pick.bucket,
        symbol: symbol.to_string(),
        ret_short: pick.record.ret_short,
        ret_long: pick.record.ret_long,
        vol_ratio: pick.record.vol_ratio,
        price,
        quote_volume: ticker.and_then(|t| t.quote_volume),
        pct_change_24h: ticker.and_then(|t| t.price_change_percent),
        ema_long: ema(&closes, settings.ema_period),
        rsi: rsi(&closes, settings.rsi_period),
        open_interest: oi,
        oi_change_pct: oi_change_pct(oi, prev_oi),
        funding_rate: premium.last_funding_rate,
        mark_price: premium.mark_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oi_change() {
        assert_eq!(oi_change_pct(Some(110.0), Some(100.0)).map(|v| v.round()), Some(10.0));
        assert_eq!(oi_change_pct(Some(110.0), None), None);
        assert_eq!(oi_change_pct(None, Some(100.0)), None);
        assert_eq!(oi_change_pct(Some(110.0), Some(0.0)), None);
        assert_eq!(oi_change_pct(Some(110.0), Some(-1.0)), None);
    }

    #[test]
    fn test_price_vs_ema_needs_both() {
        let mut record = EnrichedRecord {
            bucket: Bucket::LongUp,
            symbol: "BTCUSDT".into(),
            ret_short: None,
            ret_long: None,
            vol_ratio: None,
            price: Some(105.0),
            quote_volume: None,
            pct_change_24h: None,
            ema_long: Some(100.0),
            rsi: None,
            open_interest: None,
            oi_change_pct: None,
            funding_rate: None,
            mark_price: None,
        };
        assert_eq!(record.price_vs_ema_long(), Some(5.0));
        assert_eq!(record.annotation_input().price_vs_ema_long, Some(5.0));

        record.ema_long = None;
        assert_eq!(record.price_vs_ema_long(), None);
    }
}
