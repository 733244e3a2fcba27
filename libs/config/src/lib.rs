//! # Movers Configuration
//!
//! Centralized configuration loading and defaults for the movers digest
//! services.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use movers_config::{load_config, resolve_config_path, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
//!
//! let path = resolve_config_path(CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH);
//! let config = load_config(Some(&path)).unwrap();
//! println!("polling {} every hour", config.binance.base_url);
//! ```

pub mod service;
pub mod service_config;

// Re-export commonly used types
pub use service_config::{
    load_config, resolve_config_path, AnnotatorSettings, BinanceSettings, DigestSettings,
    MoversConfig, RuntimeSettings, ScheduleSettings, TelegramSettings, CONFIG_PATH_ENV,
    DEFAULT_CONFIG_PATH,
};
