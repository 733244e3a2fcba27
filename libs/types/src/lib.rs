//! # Movers Shared Types
//!
//! Type definitions shared between the external collaborators (exchange,
//! messaging and annotation adapters) and the digest service.
//!
//! ## Design Philosophy
//!
//! - **Lenient at the edge**: exchange payloads carry numbers as decimal
//!   strings; anything that fails to parse becomes `None` instead of an error
//! - **Finite or absent**: every `f64` exposed by this crate is finite
//! - **One vocabulary**: the four report [`Bucket`]s are defined once and used
//!   by the ranking pipeline, the annotation payload and the formatter
//!
//! ## Quick Start
//!
//! ```rust
//! use movers_types::{Candle, InstrumentInfo};
//!
//! let row = serde_json::json!([1700000000000u64, "1.0", "1.2", "0.9", "1.1", "350.5", 1700003599999u64]);
//! let candle = Candle::from_kline(row.as_array().unwrap()).unwrap();
//! assert_eq!(candle.close, Some(1.1));
//!
//! let info = InstrumentInfo {
//!     symbol: "BTCUSDT".to_string(),
//!     quote_asset: "USDT".to_string(),
//!     contract_type: "PERPETUAL".to_string(),
//!     status: "TRADING".to_string(),
//! };
//! assert!(info.is_usdt_perpetual());
//! ```

pub mod annotation;
pub mod bucket;
pub mod errors;
pub mod market;
pub mod messaging;
pub mod parse;

pub use annotation::{AnnotationInput, ReasonMap};
pub use bucket::{Bucket, Direction, Horizon};
pub use errors::TypeError;
pub use market::{Candle, ExchangeInfo, InstrumentInfo, OpenInterest, PremiumIndex, Ticker24h};
pub use messaging::DeliveryReceipt;
pub use parse::{lenient_f64, parse_lenient_f64};
