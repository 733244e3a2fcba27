//! # Movers Digest - Hourly Futures Movers Report
//!
//! ## Purpose
//!
//! Polls Binance USDT-M perpetual futures once an hour, finds the biggest
//! movers over the last 12 and 24 hours, enriches them with technical and
//! derivatives metrics, attaches two short reasons per mover and delivers a
//! formatted digest to a Telegram chat.
//!
//! ## Integration Points
//!
//! - **Market data**: [`adapter_service::MarketData`] (Binance futures REST)
//! - **Messaging**: [`adapter_service::Messenger`] (Telegram Bot API)
//! - **Annotation**: [`adapter_service::Annotator`] (OpenAI Responses API),
//!   with a deterministic rule-based fallback in [`annotate`]
//! - **State**: JSON file of last observed open interest ([`state`])
//! - **Configuration**: `movers-config` layered TOML + environment
//!
//! ## Architecture Role
//!
//! ```text
//! exchangeInfo → [universe_filter] → klines ×N → [compute_features] → [rank]
//!                                                                      ↓
//! Telegram ← [format_report] ← [annotate] ← [enrich] ×4 ← [select_movers]
//!                  ↓
//!            state.json (open interest carry-over)
//! ```
//!
//! ## Ranking and Selection
//!
//! Each instrument gets a 12h return, a 24h return and a volume-surge ratio
//! from its last 25 hourly candles ([`features`]). The universe is ranked on
//! both returns in both directions ([`ranker`]); the head of each view is the
//! pick for its bucket. [`selector`] then makes the four picks distinct by
//! scanning the views in a fixed order for unused replacements, keeping each
//! pick's bucket label.
//!
//! ## Failure Model
//!
//! - A failed request for one instrument drops that instrument only
//! - Annotation failures fall back to rule-based reasons
//! - A missing or corrupt state file starts empty
//! - A failed cycle is logged and the schedule carries on
//!
//! ## Example
//!
//! ```rust
//! use movers_digest::{compute_features, rank, select_movers};
//! use movers_types::{Bucket, Candle};
//!
//! let rising: Vec<Candle> = (0..25).map(|i| Candle::with_close_volume(100.0 + i as f64, 1.0)).collect();
//! let falling: Vec<Candle> = (0..25).map(|i| Candle::with_close_volume(200.0 - i as f64, 1.0)).collect();
//! let flat: Vec<Candle> = (0..25).map(|_| Candle::with_close_volume(50.0, 1.0)).collect();
//! let drifting: Vec<Candle> = (0..25).map(|i| Candle::with_close_volume(80.0 + 0.1 * i as f64, 1.0)).collect();
//!
//! let records = vec![
//!     compute_features("UPUSDT", &rising),
//!     compute_features("DOWNUSDT", &falling),
//!     compute_features("FLATUSDT", &flat),
//!     compute_features("DRIFTUSDT", &drifting),
//! ];
//! let picks = select_movers(&rank(&records));
//!
//! assert_eq!(picks.len(), 4);
//! assert_eq!(picks[0].bucket, Bucket::ShortUp);
//! assert_eq!(picks[0].symbol(), "UPUSDT");
//! assert_eq!(picks[1].symbol(), "DOWNUSDT");
//! ```

pub mod annotate;
pub mod enricher;
pub mod error;
pub mod features;
pub mod indicators;
pub mod logging;
pub mod pipeline;
pub mod ranker;
pub mod report;
pub mod scheduler;
pub mod selector;
pub mod state;

pub use annotate::{fallback_reasons, merge_reasons, AnnotationService};
pub use enricher::{enrich, EnrichSettings, EnrichedRecord};
pub use error::{DigestError, Result};
pub use features::{compute_features, FeatureRecord};
pub use pipeline::{
    compute_universe_features, enrich_picks, run_cycle, universe_filter, CycleContext, CycleReport,
    DeliveryMode,
};
pub use ranker::{rank, RankedViews};
pub use report::format_report;
pub use scheduler::{next_run_after, run_forever, Schedule};
pub use selector::{select, select_movers, Pick};
pub use state::{PersistedState, StateStore};
