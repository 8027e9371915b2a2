use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;

use botshop::core::config::{self, GatewayConfig, StorageKind};
use botshop::core::init_logger;
use botshop::core::rate_limiter::RateLimiter;
use botshop::storage::{create_pool, MemStore, PaymentLedger};
use botshop::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};
use botshop::web_server::{start_web_server, WebState};

#[tokio::main]
async fn main() -> Result<()> {
    // Log panics from handler tasks instead of dying silently
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    // Load environment variables from .env before anything reads them;
    // LOG_FILE_PATH in particular must be visible to the logger below.
    let _ = dotenv();

    init_logger(&config::log_file_path())?;

    let config = Arc::new(GatewayConfig::from_env()?);
    log::info!(
        "Starting botshop {} (site: {}, port: {})",
        config.version_tag,
        config.site_url,
        config.web_port
    );

    let ledger = match &config.storage {
        StorageKind::Durable { path } => {
            log::info!("Using SQLite ledger at {}", path);
            let pool = create_pool(path)?;
            Arc::new(PaymentLedger::durable(Arc::new(pool)))
        }
        StorageKind::Ephemeral => {
            log::warn!("DATABASE_PATH not set, payment ledger is in-memory and resets on restart");
            Arc::new(PaymentLedger::ephemeral(MemStore::new()))
        }
    };

    let bot = create_bot(&config)?;

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    // Re-point the webhook at this deployment on every start
    let _ = bot.delete_webhook().await;
    let webhook_url = url::Url::parse(&config.webhook_url)?;
    let mut set_webhook = bot.set_webhook(webhook_url);
    if let Some(secret) = &config.webhook_secret {
        set_webhook = set_webhook.secret_token(secret.clone());
    }
    set_webhook.await?;
    log::info!("Webhook registered at {}", config.webhook_url);

    let deps = HandlerDeps {
        ledger: ledger.clone(),
        config: config.clone(),
        rate_limiter: Arc::new(RateLimiter::new()),
    };
    let state = WebState {
        config,
        ledger,
        bot,
        schema: Arc::new(schema(deps)),
    };

    start_web_server(state).await
}
