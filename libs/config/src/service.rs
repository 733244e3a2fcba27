//! Service defaults
//!
//! Default values used when neither the config file nor the environment
//! provides a setting.

/// Exchange (Binance USDT-M futures) defaults
pub mod binance {
    pub const BASE_URL: &str = "https://fapi.binance.com";

    /// Binance grants 2400 request weight per minute per IP; stay at half
    pub const REQUESTS_PER_MINUTE: u32 = 1200;
}

/// Messaging channel defaults
pub mod telegram {
    pub const BASE_URL: &str = "https://api.telegram.org";

    /// Hard limit of `sendMessage` text, in characters
    pub const MAX_MESSAGE_CHARS: usize = 4096;
}

/// Annotation service defaults
pub mod annotator {
    pub const BASE_URL: &str = "https://api.openai.com/v1";
    pub const MODEL: &str = "gpt-5-mini";
}

/// Runtime defaults
pub mod runtime {
    /// Maximum in-flight exchange requests
    pub const CONCURRENCY: usize = 20;

    pub const REQUEST_TIMEOUT_SECS: u64 = 12;

    pub const STATE_FILE: &str = "state.json";
}

/// Schedule defaults (KST, five seconds past the hour)
pub mod schedule {
    pub const UTC_OFFSET_HOURS: i32 = 9;
    pub const AT_MINUTE: u32 = 0;
    pub const AT_SECOND: u32 = 5;
}

/// Digest pipeline defaults
pub mod digest {
    /// One-hour candles needed for the 12h/24h returns
    pub const FEATURE_WINDOW: usize = 25;

    /// One-hour candles fetched for EMA/RSI on selected instruments
    pub const ENRICH_WINDOW: usize = 200;

    pub const EMA_PERIOD: usize = 50;
    pub const RSI_PERIOD: usize = 14;
}
