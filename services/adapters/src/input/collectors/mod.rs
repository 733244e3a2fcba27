//! Exchange REST collectors

pub mod binance;

pub use binance::BinanceFuturesClient;
