//! One digest cycle: discovery, ranking, selection, enrichment, annotation,
//! formatting, persistence and delivery
//!
//! Per-instrument failures are logged once and the instrument is dropped
//! from that stage. Only universe discovery, an empty ranking and delivery
//! fail the cycle.

use adapter_service::{MarketData, Messenger, RequestLimiter};
use chrono::{FixedOffset, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use movers_types::{DeliveryReceipt, InstrumentInfo, Ticker24h};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::annotate::AnnotationService;
use crate::enricher::{enrich, EnrichSettings, EnrichedRecord};
use crate::error::{DigestError, Result};
use crate::features::{compute_features, FeatureRecord, FEATURE_WINDOW};
use crate::logging::LogEmoji;
use crate::ranker::rank;
use crate::report::format_report;
use crate::selector::{select_movers, Pick};
use crate::state::{PersistedState, StateStore};
use crate::{log_metrics, log_search};

/// What to do with the formatted digest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Persist state, then send to the configured chat
    Deliver,
    /// Neither persist nor send; the text is only returned
    DryRun,
}

/// Collaborators and settings for a cycle
#[derive(Clone)]
pub struct CycleContext {
    pub market: Arc<dyn MarketData>,
    pub messenger: Arc<dyn Messenger>,
    pub annotations: AnnotationService,
    pub store: StateStore,
    pub chat_id: String,
    /// Offset used for the report timestamp
    pub utc_offset: FixedOffset,
    pub feature_window: usize,
    pub enrich: EnrichSettings,
    pub max_message_chars: usize,
    /// Limiter behind `market`, for end-of-cycle request stats
    pub limiter: Option<RequestLimiter>,
}

/// Outcome of a completed cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub universe: usize,
    pub ranked: usize,
    pub picks: Vec<Pick>,
    pub enriched: Vec<EnrichedRecord>,
    pub text: String,
    pub receipt: Option<DeliveryReceipt>,
}

/// Symbols of USDT-quoted perpetuals that are trading, in listing order
pub fn universe_filter(instruments: &[InstrumentInfo]) -> Vec<String> {
    instruments
        .iter()
        .filter(|i| i.is_usdt_perpetual())
        .map(|i| i.symbol.clone())
        .collect()
}

/// Features for every symbol, in `symbols` order
///
/// Requests run concurrently (bounded by the market client's limiter) and
/// complete in any order; results are put back in input order so ranking
/// ties resolve by listing order. Failed symbols are left out.
pub async fn compute_universe_features(
    market: &dyn MarketData,
    symbols: &[String],
    window: usize,
) -> Vec<FeatureRecord> {
    let mut pending: FuturesUnordered<_> = symbols
        .iter()
        .enumerate()
        .map(|(idx, symbol)| async move {
            let outcome = market.recent_candles(symbol, window).await;
            (idx, symbol, outcome)
        })
        .collect();

    let mut records: Vec<(usize, FeatureRecord)> = Vec::with_capacity(symbols.len());
    let mut failed = 0usize;

    while let Some((idx, symbol, outcome)) = pending.next().await {
        match outcome {
            Ok(candles) => records.push((idx, compute_features(symbol, &candles))),
            Err(e) => {
                failed += 1;
                debug!(symbol = %symbol, error = %e, "Candle fetch failed, skipping instrument");
            }
        }
    }

    if failed > 0 {
        warn!("{} {} of {} candle requests failed", LogEmoji::WARNING, failed, symbols.len());
    }

    records.sort_by_key(|(idx, _)| *idx);
    records.into_iter().map(|(_, record)| record).collect()
}

/// Enrich every pick concurrently and return results in bucket order
///
/// Prior open interest is read before dispatch. New open interest is
/// written into `state` as each enrichment completes.
pub async fn enrich_picks(
    market: &dyn MarketData,
    picks: &[Pick],
    tickers: &HashMap<String, Ticker24h>,
    state: &mut PersistedState,
    settings: &EnrichSettings,
) -> Vec<EnrichedRecord> {
    let mut pending: FuturesUnordered<_> = picks
        .iter()
        .map(|pick| {
            let prev_oi = state.prev_oi(pick.symbol());
            let ticker = tickers.get(pick.symbol());
            async move { (pick, enrich(market, pick, ticker, prev_oi, settings).await) }
        })
        .collect();

    let mut enriched = Vec::with_capacity(picks.len());
    while let Some((pick, outcome)) = pending.next().await {
        match outcome {
            Ok(record) => {
                if let Some(oi) = record.open_interest {
                    state.set_oi(&record.symbol, oi);
                }
                enriched.push(record);
            }
            Err(e) => warn!(
                bucket = %pick.bucket,
                symbol = %pick.symbol(),
                error = %e,
                "{} Enrichment failed, dropping from report",
                LogEmoji::WARNING
            ),
        }
    }

    enriched.sort_by_key(|r| r.bucket.order());
    enriched
}

/// Run one complete cycle
pub async fn run_cycle(ctx: &CycleContext, mode: DeliveryMode) -> Result<CycleReport> {
    let market = ctx.market.as_ref();

    let instruments = market
        .list_instruments()
        .await
        .map_err(|e| DigestError::market_data("list instruments", e))?;
    let symbols = universe_filter(&instruments);
    if symbols.is_empty() {
        return Err(DigestError::EmptyUniverse);
    }
    log_search!("Universe: {} USDT perpetuals of {} listed", symbols.len(), instruments.len());

    let tickers: HashMap<String, Ticker24h> = market
        .all_tickers()
        .await
        .map_err(|e| DigestError::market_data("24h tickers", e))?
        .into_iter()
        .map(|t| (t.symbol.clone(), t))
        .collect();

    let window = ctx.feature_window.max(FEATURE_WINDOW);
    let features = compute_universe_features(market, &symbols, window).await;
    let views = rank(&features);
    if views.is_empty() {
        return Err(DigestError::NothingToRank);
    }

    let picks = select_movers(&views);
    log_metrics!(
        "Ranked {} instruments, selected {}",
        features.len(),
        picks
            .iter()
            .map(|p| format!("{}={}", p.bucket, p.symbol()))
            .collect::<Vec<_>>()
            .join(" ")
    );

    let mut state = ctx.store.load();
    let enriched = enrich_picks(market, &picks, &tickers, &mut state, &ctx.enrich).await;

    let items: Vec<_> = enriched.iter().map(EnrichedRecord::annotation_input).collect();
    let reasons = ctx.annotations.summarize(&items).await;

    let now = Utc::now().with_timezone(&ctx.utc_offset);
    let text = format_report(&now, &enriched, &reasons, ctx.max_message_chars);

    if let Some(limiter) = &ctx.limiter {
        let stats = limiter.tracker().stats();
        debug!(
            total = stats.total,
            failed = stats.failed,
            timed_out = stats.timed_out,
            success_rate = stats.success_rate(),
            "Exchange request stats"
        );
    }

    let receipt = match mode {
        DeliveryMode::DryRun => {
            info!("Dry run: state not saved, digest not sent");
            None
        }
        DeliveryMode::Deliver => {
            // Saved before sending so a failed delivery keeps the OI observations
            match ctx.store.save(&mut state) {
                Ok(()) => debug!("{} State saved to {:?}", LogEmoji::SAVE, ctx.store.path()),
                Err(e) => warn!("{} Failed to save state: {}", LogEmoji::WARNING, e),
            }

            let receipt = ctx
                .messenger
                .send_message(&ctx.chat_id, &text)
                .await
                .map_err(DigestError::Delivery)?;
            info!("{} Digest delivered ({} chars)", LogEmoji::SEND, receipt.chars_sent);
            Some(receipt)
        }
    };

    Ok(CycleReport {
        universe: symbols.len(),
        ranked: features.len(),
        picks,
        enriched,
        text,
        receipt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instrument(symbol: &str, quote: &str, contract: &str, status: &str) -> InstrumentInfo {
        InstrumentInfo {
            symbol: symbol.to_string(),
            quote_asset: quote.to_string(),
            contract_type: contract.to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn test_universe_filter() {
        let instruments = vec![
            instrument("BTCUSDT", "USDT", "PERPETUAL", "TRADING"),
            instrument("ETHUSDC", "USDC", "PERPETUAL", "TRADING"),
            instrument("BTCUSDT_240628", "USDT", "CURRENT_QUARTER", "TRADING"),
            instrument("OLDUSDT", "USDT", "PERPETUAL", "SETTLING"),
            instrument("SOLUSDT", "USDT", "PERPETUAL", "TRADING"),
        ];
        assert_eq!(universe_filter(&instruments), vec!["BTCUSDT", "SOLUSDT"]);
    }
}
