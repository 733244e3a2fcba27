//! Short reasons per mover: annotation service with a rule-based fallback
//!
//! Every reported symbol ends up with exactly two reasons. Whatever the
//! service leaves out is filled from [`fallback_reasons`], which only looks
//! at the numbers it is given.

use adapter_service::{AdapterError, Annotator};
use movers_types::{AnnotationInput, ReasonMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// Reasons shown per symbol
pub const REASONS_PER_SYMBOL: usize = 2;

const VOLUME_SURGE: &str = "Volume surge (short-term crowding)";
const OI_RISING: &str = "OI rising (new positions)";
const RSI_OVERHEATED: &str = "RSI overheated (chase zone)";
const RSI_OVERSOLD: &str = "RSI oversold (bounce or breakdown)";
const ABOVE_EMA: &str = "Above EMA50 (trend intact)";
const BELOW_EMA: &str = "Below EMA50 (trend weak)";
const FUNDING_POSITIVE: &str = "Funding positive (longs paying)";
const FUNDING_NEGATIVE: &str = "Funding negative (shorts paying)";

const PADDING: [&str; REASONS_PER_SYMBOL] = ["Momentum-driven move", "No standout positioning signal"];

/// Deterministic reasons for one item, in rule order
pub fn rule_reasons(item: &AnnotationInput) -> Vec<String> {
    let mut reasons: Vec<&str> = Vec::new();

    if item.vol_ratio.is_some_and(|v| v >= 2.0) {
        reasons.push(VOLUME_SURGE);
    }
    if item.oi_chg_pct.is_some_and(|v| v >= 3.0) {
        reasons.push(OI_RISING);
    }
    match item.rsi {
        Some(v) if v >= 70.0 => reasons.push(RSI_OVERHEATED),
        Some(v) if v <= 30.0 => reasons.push(RSI_OVERSOLD),
        _ => {}
    }
    match item.price_vs_ema_long {
        Some(v) if v >= 0.0 => reasons.push(ABOVE_EMA),
        Some(_) => reasons.push(BELOW_EMA),
        None => {}
    }
    match item.funding {
        Some(v) if v > 0.0 => reasons.push(FUNDING_POSITIVE),
        Some(v) if v < 0.0 => reasons.push(FUNDING_NEGATIVE),
        _ => {}
    }

    let mut out: Vec<String> = reasons.into_iter().take(REASONS_PER_SYMBOL).map(String::from).collect();
    pad(&mut out);
    out
}

/// Rule-based reasons for every item
pub fn fallback_reasons(items: &[AnnotationInput]) -> ReasonMap {
    items
        .iter()
        .map(|item| (item.symbol.clone(), rule_reasons(item)))
        .collect()
}

/// Combine service output with the fallback so each item has two reasons
///
/// Service reasons come first. Symbols the service omitted, or gave fewer
/// than two non-empty reasons for, are topped up from the rules.
pub fn merge_reasons(items: &[AnnotationInput], service: &ReasonMap) -> ReasonMap {
    let mut merged = ReasonMap::new();

    for item in items {
        let mut reasons: Vec<String> = service
            .get(&item.symbol)
            .map(|list| {
                list.iter()
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .take(REASONS_PER_SYMBOL)
                    .collect()
            })
            .unwrap_or_default();

        for rule in rule_reasons(item) {
            if reasons.len() >= REASONS_PER_SYMBOL {
                break;
            }
            if !reasons.contains(&rule) {
                reasons.push(rule);
            }
        }
        pad(&mut reasons);

        merged.insert(item.symbol.clone(), reasons);
    }

    merged
}

fn pad(reasons: &mut Vec<String>) {
    for filler in PADDING {
        if reasons.len() >= REASONS_PER_SYMBOL {
            break;
        }
        if !reasons.iter().any(|r| r == filler) {
            reasons.push(filler.to_string());
        }
    }
}

/// Annotation with graceful degradation
///
/// Never fails: a missing, failing or unparseable service yields the
/// rule-based reasons.
#[derive(Clone)]
pub struct AnnotationService {
    annotator: Option<Arc<dyn Annotator>>,
}

impl AnnotationService {
    pub fn new(annotator: Arc<dyn Annotator>) -> Self {
        Self {
            annotator: Some(annotator),
        }
    }

    /// Service that always uses the rules
    pub fn rules_only() -> Self {
        Self { annotator: None }
    }

    pub async fn summarize(&self, items: &[AnnotationInput]) -> ReasonMap {
        if items.is_empty() {
            return ReasonMap::new();
        }

        let Some(annotator) = &self.annotator else {
            return fallback_reasons(items);
        };

        match annotator.summarize(items).await {
            Ok(reasons) => {
                debug!(symbols = reasons.len(), "Annotation service answered");
                merge_reasons(items, &reasons)
            }
            Err(AdapterError::Disabled(what)) => {
                debug!("{} not configured, using rule-based reasons", what);
                fallback_reasons(items)
            }
            Err(e) => {
                warn!(error = %e, recoverable = e.is_recoverable(), "Annotation failed, using rule-based reasons");
                fallback_reasons(items)
            }
        }
    }
}
