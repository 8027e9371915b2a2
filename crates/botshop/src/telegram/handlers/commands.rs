//! Command endpoints: /start, /site, /invite and the admin review verbs.

use teloxide::prelude::*;
use teloxide::types::Message;

use crate::storage::ReviewVerdict;
use crate::telegram::handlers::types::{HandlerDeps, HandlerResult};
use crate::telegram::menu;

/// True when `text` invokes `/name`, including the `/name@BotName` form
/// used in groups. Arguments after the command do not affect the match.
pub fn command_matches(text: &str, name: &str) -> bool {
    let Some(rest) = text.trim_start().strip_prefix('/') else {
        return false;
    };
    let token = rest.split_whitespace().next().unwrap_or("");
    let bare = token.split('@').next().unwrap_or("");
    bare.eq_ignore_ascii_case(name)
}

#[derive(Debug, PartialEq, Eq)]
pub enum ArgError {
    Missing,
    NotAnInteger,
}

/// Parses `/approve <user_id> [reason...]` style arguments.
pub fn parse_review_args(text: &str) -> Result<(i64, Option<String>), ArgError> {
    let mut parts = text.split_whitespace();
    parts.next(); // the command itself
    let id_token = parts.next().ok_or(ArgError::Missing)?;
    let user_id: i64 = id_token.parse().map_err(|_| ArgError::NotAnInteger)?;
    let reason = parts.collect::<Vec<_>>().join(" ");
    let reason = if reason.is_empty() { None } else { Some(reason) };
    Ok((user_id, reason))
}

async fn send_or_log(bot: &Bot, chat_id: ChatId, text: String) {
    if let Err(e) = bot.send_message(chat_id, text).await {
        log::error!("Failed to send message to {}: {}", chat_id, e);
    }
}

pub async fn handle_start(bot: Bot, msg: Message, deps: HandlerDeps) -> HandlerResult {
    log::info!("Received /start from chat {}", msg.chat.id);
    let text = menu::start_message(&deps.config);
    let keyboard = menu::main_menu(&deps.config);
    if let Err(e) = bot
        .send_message(msg.chat.id, text)
        .reply_markup(keyboard)
        .await
    {
        log::error!("Failed to send /start menu to {}: {}", msg.chat.id, e);
    }
    Ok(())
}

pub async fn handle_site(bot: Bot, msg: Message, deps: HandlerDeps) -> HandlerResult {
    send_or_log(&bot, msg.chat.id, format!("🌐 {}", deps.config.site_url)).await;
    Ok(())
}

pub async fn handle_invite(bot: Bot, msg: Message, deps: HandlerDeps) -> HandlerResult {
    send_or_log(&bot, msg.chat.id, menu::invite_reply(&deps.config)).await;
    Ok(())
}

/// `/approve <user_id> [note]`: marks the user's latest payment approved.
pub async fn handle_approve(bot: Bot, msg: Message, deps: HandlerDeps) -> HandlerResult {
    let text = msg.text().unwrap_or_default();
    let (user_id, reason) = match parse_review_args(text) {
        Ok(parsed) => parsed,
        Err(_) => {
            send_or_log(&bot, msg.chat.id, "Usage: /approve <user_id> [note]".to_string()).await;
            return Ok(());
        }
    };

    match deps
        .ledger
        .resolve_latest(user_id, ReviewVerdict::Approved, reason.as_deref())
    {
        Ok(true) => {
            let invite = deps
                .config
                .invite_link
                .as_deref()
                .unwrap_or("<not configured>");
            log::info!("Payment approved for user {}", user_id);
            send_or_log(
                &bot,
                msg.chat.id,
                format!("✅ Approved latest payment of user {}.\nInvite link: {}", user_id, invite),
            )
            .await;
        }
        Ok(false) => {
            send_or_log(
                &bot,
                msg.chat.id,
                format!("No payment records found for user {}.", user_id),
            )
            .await;
        }
        Err(e) => {
            log::error!("Ledger error while approving user {}: {}", user_id, e);
            send_or_log(
                &bot,
                msg.chat.id,
                "Storage error, the review was not recorded. Try again.".to_string(),
            )
            .await;
        }
    }
    Ok(())
}

/// `/reject <user_id> [reason]`: marks the user's latest payment rejected.
pub async fn handle_reject(bot: Bot, msg: Message, deps: HandlerDeps) -> HandlerResult {
    let text = msg.text().unwrap_or_default();
    let (user_id, reason) = match parse_review_args(text) {
        Ok(parsed) => parsed,
        Err(_) => {
            send_or_log(&bot, msg.chat.id, "Usage: /reject <user_id> [reason]".to_string()).await;
            return Ok(());
        }
    };
    let reason = reason.unwrap_or_else(|| "unspecified".to_string());

    match deps
        .ledger
        .resolve_latest(user_id, ReviewVerdict::Rejected, Some(&reason))
    {
        Ok(true) => {
            log::info!("Payment rejected for user {} ({})", user_id, reason);
            send_or_log(
                &bot,
                msg.chat.id,
                format!("🚫 Rejected latest payment of user {} ({}).", user_id, reason),
            )
            .await;
        }
        Ok(false) => {
            send_or_log(
                &bot,
                msg.chat.id,
                format!("No payment records found for user {}.", user_id),
            )
            .await;
        }
        Err(e) => {
            log::error!("Ledger error while rejecting user {}: {}", user_id, e);
            send_or_log(
                &bot,
                msg.chat.id,
                "Storage error, the review was not recorded. Try again.".to_string(),
            )
            .await;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn command_matching_handles_group_suffix_and_args() {
        assert!(command_matches("/start", "start"));
        assert!(command_matches("/start@GateBot hello", "start"));
        assert!(command_matches("  /APPROVE 42", "approve"));
        assert!(!command_matches("/started", "start"));
        assert!(!command_matches("start", "start"));
        assert!(!command_matches("", "start"));
    }

    #[test]
    fn review_args_parse_id_and_optional_reason() {
        assert_eq!(parse_review_args("/approve 42"), Ok((42, None)));
        assert_eq!(
            parse_review_args("/reject 42 blurry photo"),
            Ok((42, Some("blurry photo".to_string())))
        );
        assert_eq!(parse_review_args("/approve"), Err(ArgError::Missing));
        assert_eq!(parse_review_args("/approve abc"), Err(ArgError::NotAnInteger));
    }
}
