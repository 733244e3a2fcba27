//! Movers Configuration Module
//!
//! Loads [`MoversConfig`] in layers, later layers overriding earlier ones:
//!
//! 1. Built-in defaults (see [`crate::service`])
//! 2. Optional TOML file (`config/movers.toml` unless overridden)
//! 3. Environment variables with the `MOVERS_` prefix and `__` between
//!    section and key, e.g. `MOVERS_RUNTIME__CONCURRENCY=10`
//! 4. Conventional plain variables for secrets (`TELEGRAM_BOT_TOKEN`,
//!    `TELEGRAM_CHAT_ID`, `OPENAI_API_KEY`, `OPENAI_MODEL`,
//!    `BINANCE_BASE_URL`) when the prefixed form left them empty

use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::service;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "MOVERS_CONFIG_PATH";

/// Config file used when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "config/movers.toml";

/// Top-level configuration of the digest service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MoversConfig {
    pub binance: BinanceSettings,
    pub telegram: TelegramSettings,
    pub annotator: AnnotatorSettings,
    pub runtime: RuntimeSettings,
    pub schedule: ScheduleSettings,
    pub digest: DigestSettings,
}

/// Exchange REST endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BinanceSettings {
    pub base_url: String,
    /// Requests per minute allowed against the exchange (0 disables)
    pub requests_per_minute: u32,
}

/// Messaging channel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    pub base_url: String,
    pub bot_token: String,
    pub chat_id: String,
    pub disable_web_page_preview: bool,
}

/// Annotation service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorSettings {
    pub base_url: String,
    /// Empty disables the service; the rule-based fallback is used instead
    pub api_key: String,
    pub model: String,
}

/// Process-wide runtime settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Maximum in-flight exchange requests
    pub concurrency: usize,
    pub request_timeout_secs: u64,
    pub state_file: PathBuf,
    pub log_json: bool,
}

/// Hourly schedule settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// Offset from UTC used to compute the hour boundary and report header
    pub utc_offset_hours: i32,
    pub at_minute: u32,
    pub at_second: u32,
}

/// Ranking and enrichment window settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestSettings {
    pub feature_window: usize,
    pub enrich_window: usize,
    pub ema_period: usize,
    pub rsi_period: usize,
    pub max_message_chars: usize,
}

impl Default for BinanceSettings {
    fn default() -> Self {
        Self {
            base_url: service::binance::BASE_URL.to_string(),
            requests_per_minute: service::binance::REQUESTS_PER_MINUTE,
        }
    }
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            base_url: service::telegram::BASE_URL.to_string(),
            bot_token: String::new(),
            chat_id: String::new(),
            disable_web_page_preview: true,
        }
    }
}

impl Default for AnnotatorSettings {
    fn default() -> Self {
        Self {
            base_url: service::annotator::BASE_URL.to_string(),
            api_key: String::new(),
            model: service::annotator::MODEL.to_string(),
        }
    }
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            concurrency: service::runtime::CONCURRENCY,
            request_timeout_secs: service::runtime::REQUEST_TIMEOUT_SECS,
            state_file: PathBuf::from(service::runtime::STATE_FILE),
            log_json: false,
        }
    }
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            utc_offset_hours: service::schedule::UTC_OFFSET_HOURS,
            at_minute: service::schedule::AT_MINUTE,
            at_second: service::schedule::AT_SECOND,
        }
    }
}

impl Default for DigestSettings {
    fn default() -> Self {
        Self {
            feature_window: service::digest::FEATURE_WINDOW,
            enrich_window: service::digest::ENRICH_WINDOW,
            ema_period: service::digest::EMA_PERIOD,
            rsi_period: service::digest::RSI_PERIOD,
            max_message_chars: service::telegram::MAX_MESSAGE_CHARS,
        }
    }
}

impl MoversConfig {
    /// Load configuration from defaults, an optional file and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::load_from_sources(path, None)?;
        config.apply_env_fallbacks(|key| std::env::var(key).ok());
        config.expand_paths()?;
        Ok(config)
    }

    /// Load with an explicit environment map instead of the process environment
    ///
    /// `env: None` reads the real environment for the `MOVERS_` layer.
    pub fn load_from_sources(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .context("Failed to serialize default configuration")?;

        let mut builder = Config::builder().add_source(defaults);

        match path {
            Some(path) => {
                info!("Loading config file: {:?}", path);
                builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
            }
            None => {
                debug!("No config file given, trying {}", DEFAULT_CONFIG_PATH);
                builder = builder.add_source(
                    File::from(Path::new(DEFAULT_CONFIG_PATH))
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        // Override with environment variables (MOVERS_ prefix)
        builder = builder.add_source(
            Environment::with_prefix("MOVERS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Fill empty secrets from conventional plain environment variables
    pub fn apply_env_fallbacks<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fill = |slot: &mut String, key: &str| {
            if slot.is_empty() {
                if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                    *slot = value;
                }
            }
        };

        fill(&mut self.telegram.bot_token, "TELEGRAM_BOT_TOKEN");
        fill(&mut self.telegram.chat_id, "TELEGRAM_CHAT_ID");
        fill(&mut self.annotator.api_key, "OPENAI_API_KEY");

        // These have non-empty defaults, so the plain variable wins when set
        if let Some(model) = lookup("OPENAI_MODEL").filter(|v| !v.is_empty()) {
            self.annotator.model = model;
        }
        if let Some(url) = lookup("BINANCE_BASE_URL").filter(|v| !v.is_empty()) {
            self.binance.base_url = url;
        }
    }

    /// Expand `~` and `$VAR` in path settings
    pub fn expand_paths(&mut self) -> Result<()> {
        let raw = self.runtime.state_file.to_string_lossy().into_owned();
        let expanded = shellexpand::full(&raw).context("Failed to expand state file path")?;
        self.runtime.state_file = PathBuf::from(expanded.as_ref());
        Ok(())
    }

    /// Check ranges of the settings every mode needs
    pub fn validate(&self) -> Result<()> {
        if self.runtime.concurrency == 0 {
            bail!("runtime.concurrency must be at least 1");
        }
        if self.runtime.request_timeout_secs == 0 {
            bail!("runtime.request_timeout_secs must be at least 1");
        }
        if self.schedule.at_minute > 59 {
            bail!("schedule.at_minute must be within 0..=59, got {}", self.schedule.at_minute);
        }
        if self.schedule.at_second > 59 {
            bail!("schedule.at_second must be within 0..=59, got {}", self.schedule.at_second);
        }
        if !(-12..=14).contains(&self.schedule.utc_offset_hours) {
            bail!(
                "schedule.utc_offset_hours must be within -12..=14, got {}",
                self.schedule.utc_offset_hours
            );
        }
        if self.digest.feature_window < service::digest::FEATURE_WINDOW {
            bail!(
                "digest.feature_window must be at least {}, got {}",
                service::digest::FEATURE_WINDOW,
                self.digest.feature_window
            );
        }
        if self.digest.max_message_chars < 64 {
            bail!("digest.max_message_chars is too small: {}", self.digest.max_message_chars);
        }
        if self.digest.max_message_chars > service::telegram::MAX_MESSAGE_CHARS {
            bail!(
                "digest.max_message_chars must be at most {}, got {}",
                service::telegram::MAX_MESSAGE_CHARS,
                self.digest.max_message_chars
            );
        }
        Ok(())
    }

    /// Check the settings required to deliver a digest
    pub fn validate_delivery(&self) -> Result<()> {
        self.validate()?;
        if self.telegram.bot_token.is_empty() {
            bail!("telegram.bot_token is not set (MOVERS_TELEGRAM__BOT_TOKEN or TELEGRAM_BOT_TOKEN)");
        }
        if self.telegram.chat_id.is_empty() {
            bail!("telegram.chat_id is not set (MOVERS_TELEGRAM__CHAT_ID or TELEGRAM_CHAT_ID)");
        }
        Ok(())
    }
}

/// Resolve the config file path from an environment variable, falling back to a default
pub fn resolve_config_path(env_var: &str, default: &str) -> PathBuf {
    std::env::var(env_var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

/// Convenience function: load, then validate the settings every mode needs
pub fn load_config(path: Option<&Path>) -> Result<MoversConfig> {
    let config = MoversConfig::load(path)?;
    config.validate()?;
    Ok(config)
}
