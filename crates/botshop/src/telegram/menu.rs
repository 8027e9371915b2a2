//! Main menu keyboard and the text panels behind its buttons.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::core::config::GatewayConfig;

/// Inline main menu shown with the welcome message.
///
/// Each button carries an opaque callback tag; the callback handler maps
/// the tag back to a panel via [`panel_text`].
pub fn main_menu(config: &GatewayConfig) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            format!("💳 Join the community ({} NIS)", config.join_price_nis),
            "join",
        )],
        vec![InlineKeyboardButton::callback("🏦 Add / update bank account", "update_bank")],
        vec![InlineKeyboardButton::callback("🤖 AI assistant", "ai_helper")],
        vec![InlineKeyboardButton::callback("ℹ️ What do I get?", "info")],
        vec![InlineKeyboardButton::callback("📣 Share the gateway", "share")],
        vec![InlineKeyboardButton::callback("🛟 Support", "support")],
    ])
}

/// Welcome text for /start.
pub fn start_message(config: &GatewayConfig) -> String {
    format!(
        "🌐 Community gateway\n\
         Join price: {} NIS\n\
         \n\
         Pick a payment method:\n\
         • Bank transfer\n\
         • Bit / Paybox / PayPal\n\
         • Telegram (TON)\n\
         \n\
         After paying:\n\
         1) Send a photo or document of the payment confirmation here.\n\
         2) It is reviewed manually.\n\
         3) Once approved you will receive the community invite link.\n\
         \n\
         Site: {}\n\
         Invite link (if configured): /invite",
        config.join_price_nis, config.site_url
    )
}

/// Text panel for a callback button tag. `None` for unknown tags.
pub fn panel_text(tag: &str, config: &GatewayConfig) -> Option<String> {
    let text = match tag {
        "join" => format!(
            "💳 Joining costs {} NIS.\n\
             \n\
             Pay by bank transfer, Bit/Paybox/PayPal or TON, then send a\n\
             photo or document of the confirmation here. Proofs are\n\
             reviewed manually.",
            config.join_price_nis
        ),
        "update_bank" => "🏦 Send your bank account details as a message and\n\
             an admin will update your payout profile."
            .to_string(),
        "ai_helper" => "🤖 The AI assistant is available to members inside the\n\
             community group."
            .to_string(),
        "info" => format!(
            "ℹ️ Membership includes the private business community group,\n\
             the AI assistant and the member resources at {}.",
            config.site_url
        ),
        "share" => format!("📣 Share the gateway with a friend: {}", config.site_url),
        "support" => "🛟 Reply here with your question and a human will get\n\
             back to you."
            .to_string(),
        _ => return None,
    };
    Some(text)
}

/// Reply for /invite.
pub fn invite_reply(config: &GatewayConfig) -> String {
    match &config.invite_link {
        Some(link) => format!("Community invite link:\n{}", link),
        None => "The invite link is not configured yet. Set GROUP_STATIC_INVITE in the deployment.".to_string(),
    }
}
