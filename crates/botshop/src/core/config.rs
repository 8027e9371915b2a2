//! Environment-backed gateway configuration.
//!
//! All settings are read once at startup. Values are trimmed and empty
//! strings count as absent, so a blank `WEBHOOK_SECRET=` in a deployment
//! panel behaves the same as an unset variable.

use std::env;

use anyhow::{bail, Context, Result};

/// Default community site when `SITE_URL` is not set.
const DEFAULT_SITE_URL: &str = "https://slh-nft.com";

/// Default join price in NIS when `SLH_NIS` is not set.
const DEFAULT_JOIN_PRICE_NIS: u32 = 39;

/// Default HTTP port when `WEB_PORT` is not set.
const DEFAULT_WEB_PORT: u16 = 8080;

/// Which ledger backend to use, resolved once at startup.
///
/// There is no runtime fallback between the two: if the durable backend is
/// configured but unreachable at call time, the operation fails instead of
/// silently degrading to ephemeral storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageKind {
    /// SQLite file at the given path (`DATABASE_PATH`).
    Durable { path: String },
    /// In-process store; data does not survive a restart.
    Ephemeral,
}

/// Gateway settings, resolved from the environment at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bot authentication token (`BOT_TOKEN`). Required.
    pub bot_token: String,
    /// Public webhook URL registered with Telegram (`WEBHOOK_URL`). Required.
    pub webhook_url: String,
    /// Shared secret echoed by Telegram in the webhook header
    /// (`WEBHOOK_SECRET`). When unset the ingress accepts every request,
    /// an explicit insecure-by-default mode; production deployments are
    /// expected to configure it.
    pub webhook_secret: Option<String>,
    /// Token guarding `/admin/stats` (`ADMIN_DASH_TOKEN`). When unset the
    /// endpoint always denies; it is never silently open.
    pub admin_token: Option<String>,
    /// Community site URL (`SITE_URL`), trailing slash stripped.
    pub site_url: String,
    /// Static group invite link (`GROUP_STATIC_INVITE`).
    pub invite_link: Option<String>,
    /// Join price in NIS (`SLH_NIS`).
    pub join_price_nis: u32,
    /// Version shown in `/version`, `/meta` and `/admin/stats`
    /// (`VERSION_TAG`, default "local").
    pub version_tag: String,
    /// HTTP listen port (`WEB_PORT`).
    pub web_port: u16,
    /// Optional local Bot API server override (`BOT_API_URL`).
    pub bot_api_url: Option<String>,
    /// Ledger backend, from `DATABASE_PATH` presence.
    pub storage: StorageKind,
}

impl GatewayConfig {
    /// Read the full configuration from the environment.
    ///
    /// Fails fast with a clear diagnostic on the two settings the service
    /// cannot run without: the bot token and the public webhook URL.
    pub fn from_env() -> Result<Self> {
        let Some(bot_token) = trimmed_var("BOT_TOKEN") else {
            bail!("BOT_TOKEN is required");
        };
        let Some(webhook_url) = trimmed_var("WEBHOOK_URL") else {
            bail!("WEBHOOK_URL is required (public https endpoint for Telegram webhooks)");
        };

        let site_url = trimmed_var("SITE_URL")
            .unwrap_or_else(|| DEFAULT_SITE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let join_price_nis = match trimmed_var("SLH_NIS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("SLH_NIS must be an integer, got {:?}", raw))?,
            None => DEFAULT_JOIN_PRICE_NIS,
        };

        let web_port = match trimmed_var("WEB_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("WEB_PORT must be a port number, got {:?}", raw))?,
            None => DEFAULT_WEB_PORT,
        };

        let storage = match trimmed_var("DATABASE_PATH") {
            Some(path) => StorageKind::Durable { path },
            None => StorageKind::Ephemeral,
        };

        Ok(Self {
            bot_token,
            webhook_url,
            webhook_secret: trimmed_var("WEBHOOK_SECRET"),
            admin_token: trimmed_var("ADMIN_DASH_TOKEN"),
            site_url,
            invite_link: trimmed_var("GROUP_STATIC_INVITE"),
            join_price_nis,
            version_tag: trimmed_var("VERSION_TAG").unwrap_or_else(|| "local".to_string()),
            web_port,
            bot_api_url: trimmed_var("BOT_API_URL"),
            storage,
        })
    }

    pub fn has_invite(&self) -> bool {
        self.invite_link.is_some()
    }
}

/// Log file path (`LOG_FILE_PATH`, default `botshop.log`).
///
/// Read separately from [`GatewayConfig`] because the logger is
/// initialized before configuration parsing, so config errors are logged
/// too.
pub fn log_file_path() -> String {
    trimmed_var("LOG_FILE_PATH").unwrap_or_else(|| "botshop.log".to_string())
}

fn trimmed_var(name: &str) -> Option<String> {
    env::var(name).ok().and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
