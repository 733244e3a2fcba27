//! Logging setup and the emoji vocabulary used in status lines

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

/// Standard emoji set for digest status lines
pub struct LogEmoji;

impl LogEmoji {
    pub const SUCCESS: &'static str = "✅"; // Operation succeeded
    pub const ERROR: &'static str = "❌"; // Operation failed
    pub const WARNING: &'static str = "⚠️"; // Degraded but continuing
    pub const SEARCH: &'static str = "🔍"; // Universe discovery/ranking
    pub const CHART: &'static str = "📊"; // Counts and statistics
    pub const SEND: &'static str = "📨"; // Delivery
    pub const SAVE: &'static str = "💾"; // State persistence
    pub const CLOCK: &'static str = "⏱️"; // Scheduling
}

#[macro_export]
macro_rules! log_success {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::SUCCESS, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        tracing::error!("{} {}", $crate::logging::LogEmoji::ERROR, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_search {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::SEARCH, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_metrics {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::CHART, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_schedule {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::CLOCK, format!($($arg)*))
    };
}

/// Install the global subscriber
///
/// Filter comes from `RUST_LOG`, defaulting to `info`. `json` switches to
/// one JSON object per line.
pub fn init_logging(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}
