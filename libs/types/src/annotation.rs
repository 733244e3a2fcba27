//! Annotation request/response schema
//!
//! The annotation collaborator receives a fixed numeric schema per selected
//! instrument and answers with short reasons keyed by symbol.

use crate::bucket::Bucket;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Symbol → short reasons (two per symbol once normalized)
pub type ReasonMap = BTreeMap<String, Vec<String>>;

/// Numeric snapshot of one selected instrument sent for annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationInput {
    pub symbol: String,
    pub bucket: Bucket,
    pub ret_short: Option<f64>,
    pub ret_long: Option<f64>,
    pub vol_ratio: Option<f64>,
    pub quote_vol: Option<f64>,
    pub oi: Option<f64>,
    pub oi_chg_pct: Option<f64>,
    pub funding: Option<f64>,
    pub rsi: Option<f64>,
    /// `price - ema_long`; positive means trading above the long EMA
    pub price_vs_ema_long: Option<f64>,
}
