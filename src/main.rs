mod api;
mod commands;
mod engine;
mod gateway;
mod verification;

#[cfg(test)]
mod test_support;

use clap::{Parser, Subcommand};
use goalbot_channels::telegram::TelegramClient;
use goalbot_core::config::{self, shellexpand, Config};
use goalbot_core::traits::MessagingClient;
use goalbot_memory::Store;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "goalbot",
    version,
    about = "Telegram companion bot for the goal tracker"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start polling Telegram (and the verification API when enabled).
    Start,
    /// Show configuration and chat identity counts.
    Status,
}

/// Stdout logging plus a daily log file under `{data_dir}/logs`.
///
/// The returned guard flushes the file writer on drop; hold it for the
/// lifetime of the process.
fn init_logging(cfg: &Config) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.bot.log_level));

    let log_dir = std::path::Path::new(&shellexpand(&cfg.bot.data_dir)).join("logs");
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        warn!("file logging disabled, cannot create {}: {e}", log_dir.display());
        return None;
    }

    let appender = tracing_appender::rolling::daily(&log_dir, "goalbot.log");
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    Some(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;

    match cli.command {
        Commands::Start => {
            let _log_guard = init_logging(&cfg);

            if cfg.telegram.bot_token.is_empty() {
                anyhow::bail!(
                    "Telegram bot_token is empty. \
                     Set it in config.toml or TELEGRAM_BOT_TOKEN env var."
                );
            }

            let store = Store::new(&cfg.memory).await?;

            let telegram = Arc::new(TelegramClient::new(&cfg.telegram));
            telegram.register_commands().await;
            let messenger: Arc<dyn MessagingClient> = telegram;

            let engine = engine::Engine::new(
                messenger.clone(),
                Arc::new(store.clone()),
                Arc::new(store.clone()),
                Box::new(engine::InMemoryConversations::new()),
            );
            let gw = gateway::Gateway::new(messenger.clone(), engine, &cfg.telegram);

            if cfg.api.enabled {
                let state = api::ApiState::new(
                    Arc::new(store.clone()),
                    messenger.clone(),
                    &cfg.api,
                    gw.offset_handle(),
                )?;
                tokio::spawn(api::serve(cfg.api.clone(), state));
            }

            info!("{} starting", cfg.bot.name);
            tokio::select! {
                _ = gw.run() => {}
                result = tokio::signal::ctrl_c() => {
                    result?;
                    info!("shutdown signal received, stopping");
                }
            }
        }
        Commands::Status => {
            println!("{} status\n", cfg.bot.name);
            println!("Config: {}", cli.config);
            println!(
                "  telegram: {}",
                if cfg.telegram.bot_token.is_empty() {
                    "missing bot_token"
                } else {
                    "configured"
                }
            );
            println!(
                "  api: {}",
                if cfg.api.enabled {
                    format!("enabled on {}:{}", cfg.api.host, cfg.api.port)
                } else {
                    "disabled".to_string()
                }
            );
            println!("  database: {}", shellexpand(&cfg.memory.db_path));

            let store = Store::new(&cfg.memory).await?;
            let (linked, pending) = store.identity_counts().await?;
            println!("\nChats: {linked} verified, {pending} awaiting verification");
        }
    }

    Ok(())
}
