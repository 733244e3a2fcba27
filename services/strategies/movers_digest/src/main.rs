//! Movers Digest Main Entry Point

use adapter_service::{
    BinanceFuturesClient, HttpClientConfig, OpenAiAnnotator, RequestLimiter, TelegramClient,
};
use anyhow::{Context, Result};
use chrono::FixedOffset;
use clap::{Parser, Subcommand};
use movers_config::{load_config, MoversConfig, CONFIG_PATH_ENV};
use movers_digest::logging::init_logging;
use movers_digest::{
    run_cycle, run_forever, AnnotationService, CycleContext, DeliveryMode, EnrichSettings,
    Schedule, StateStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "movers_digest", version, about = "Hourly Binance USDT-M futures movers digest")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a cycle now, then every hour (default)
    Run,
    /// Run a single cycle
    Once {
        /// Print the digest instead of sending it; state is left untouched
        #[arg(long)]
        dry_run: bool,
    },
    /// List chat ids seen by the bot (setup helper)
    ChatIds,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load movers configuration")?;
    init_logging(cli.log_json || config.runtime.log_json)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            config.validate_delivery()?;
            let (ctx, schedule) = build_context(&config)?;
            info!("Starting movers digest, state file {:?}", ctx.store.path());

            tokio::select! {
                _ = run_forever(&ctx, schedule) => {}
                result = signal::ctrl_c() => {
                    result.context("Failed to listen for shutdown signal")?;
                    info!("Shutting down movers digest");
                }
            }
        }
        Command::Once { dry_run } => {
            let mode = if dry_run {
                DeliveryMode::DryRun
            } else {
                config.validate_delivery()?;
                DeliveryMode::Deliver
            };
            let (ctx, _) = build_context(&config)?;
            let report = run_cycle(&ctx, mode).await.context("Digest cycle failed")?;

            if mode == DeliveryMode::DryRun {
                println!("{}", report.text);
            }
        }
        Command::ChatIds => {
            let client = telegram_client(&config, http_config(&config).build_client()?);
            let ids = client.chat_ids().await.context("Failed to fetch bot updates")?;
            if ids.is_empty() {
                println!("No chats found. Send a message to the bot (or post in the channel) and retry.");
            }
            for id in ids {
                println!("{}", id);
            }
        }
    }

    Ok(())
}

fn http_config(config: &MoversConfig) -> HttpClientConfig {
    HttpClientConfig {
        pool_max_idle_per_host: config.runtime.concurrency,
        ..HttpClientConfig::with_timeout(Duration::from_secs(config.runtime.request_timeout_secs))
    }
}

fn telegram_client(config: &MoversConfig, http: reqwest::Client) -> TelegramClient {
    let timeout_ms = http_config(config).request_timeout_ms;
    TelegramClient::new(
        http,
        &config.telegram.base_url,
        &config.telegram.bot_token,
        config.digest.max_message_chars,
        timeout_ms,
    )
    .with_web_page_preview(!config.telegram.disable_web_page_preview)
}

fn build_context(config: &MoversConfig) -> Result<(CycleContext, Schedule)> {
    let http_config = http_config(config);
    let http = http_config.build_client()?;
    let timeout_ms = http_config.request_timeout_ms;

    let limiter = RequestLimiter::new(config.runtime.concurrency, config.binance.requests_per_minute);
    let market = BinanceFuturesClient::new(http.clone(), &config.binance.base_url, limiter.clone(), timeout_ms);

    let annotator = OpenAiAnnotator::new(
        http.clone(),
        &config.annotator.base_url,
        &config.annotator.api_key,
        &config.annotator.model,
        timeout_ms,
    );
    let annotations = if annotator.is_enabled() {
        AnnotationService::new(Arc::new(annotator))
    } else {
        info!("No annotation API key configured, using rule-based reasons");
        AnnotationService::rules_only()
    };

    let utc_offset = FixedOffset::east_opt(config.schedule.utc_offset_hours * 3600)
        .context("Invalid schedule.utc_offset_hours")?;

    let ctx = CycleContext {
        market: Arc::new(market),
        messenger: Arc::new(telegram_client(config, http)),
        annotations,
        store: StateStore::new(&config.runtime.state_file),
        chat_id: config.telegram.chat_id.clone(),
        utc_offset,
        feature_window: config.digest.feature_window,
        enrich: EnrichSettings {
            window: config.digest.enrich_window,
            ema_period: config.digest.ema_period,
            rsi_period: config.digest.rsi_period,
        },
        max_message_chars: config.digest.max_message_chars,
        limiter: Some(limiter),
    };

    let schedule = Schedule {
        utc_offset,
        at_minute: config.schedule.at_minute,
        at_second: config.schedule.at_second,
    };

    Ok((ctx, schedule))
}
