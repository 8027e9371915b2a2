//! Bot instance creation and command registration.

use reqwest::ClientBuilder;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config::GatewayConfig;

/// Timeout for Bot API requests.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Bot commands shown in the Telegram command menu.
///
/// Dispatch itself goes through text filters in `handlers::schema` (the
/// admin commands carry free-form arguments); this enum is the single
/// source for registration and descriptions.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Community gateway commands:")]
pub enum Command {
    #[command(description = "welcome message and payment menu")]
    Start,
    #[command(description = "community site link")]
    Site,
    #[command(description = "community invite link")]
    Invite,
    #[command(description = "approve last payment (admin)")]
    Approve,
    #[command(description = "reject last payment (admin)")]
    Reject,
}

/// Creates a Bot instance with custom or default API URL.
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Invalid `BOT_API_URL` or client build failure
pub fn create_bot(config: &GatewayConfig) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?;

    let bot = Bot::with_client(config.bot_token.clone(), client);
    let bot = match &config.bot_api_url {
        Some(api_url) => {
            log::info!("Using custom Bot API URL: {}", api_url);
            let url = url::Url::parse(api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
            bot.set_api_url(url)
        }
        None => bot,
    };

    Ok(bot)
}

/// Publishes the command menu to Telegram.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_menu_covers_the_public_and_admin_commands() {
        let commands = Command::bot_commands();
        let names: Vec<String> = commands.into_iter().map(|c| c.command).collect();
        assert_eq!(names, vec!["/start", "/site", "/invite", "/approve", "/reject"]);
    }

    #[test]
    fn descriptions_mention_the_admin_scope() {
        let list = Command::descriptions().to_string();
        assert!(list.contains("admin"));
        assert!(list.contains("start"));
    }
}
