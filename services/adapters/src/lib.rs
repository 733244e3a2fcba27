//! # Movers Adapters - External Collaborators
//!
//! ## Purpose
//!
//! Thin request/response wrappers around the three external services the
//! movers digest depends on. Each service sits behind an `async_trait` seam so
//! the digest pipeline can be exercised against in-memory fakes.
//!
//! ## Integration Points
//!
//! - **Market data**: [`MarketData`] implemented by [`BinanceFuturesClient`]
//!   (USDT-M futures public REST)
//! - **Messaging**: [`Messenger`] implemented by [`TelegramClient`]
//! - **Annotation**: [`Annotator`] implemented by [`OpenAiAnnotator`]
//!
//! ## Resource Model
//!
//! One pooled `reqwest::Client` (see [`HttpClientConfig`]) is shared by every
//! collaborator in a cycle. Exchange requests additionally pass through a
//! [`RequestLimiter`]: a semaphore bounding in-flight requests plus an optional
//! per-minute budget. Every request carries the configured timeout; a timeout
//! surfaces as [`AdapterError::Timeout`] for that request only.
//!
//! ## Failure Model
//!
//! Adapters never retry and never swallow errors. Classification
//! ([`AdapterError::is_recoverable`]) exists for logging; recovery policy
//! belongs to the caller.

#![warn(missing_docs)]

pub mod annotation;
pub mod common;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod rate_limit;

pub use annotation::{parse_reasons, Annotator, OpenAiAnnotator};
pub use config::HttpClientConfig;
pub use error::{AdapterError, Result};
pub use input::{BinanceFuturesClient, MarketData, CANDLE_INTERVAL};
pub use output::{truncate_message, Messenger, TelegramClient, TRUNCATION_MARKER};
pub use rate_limit::{RequestLimiter, RequestPermit, RequestStats, RequestTracker};
