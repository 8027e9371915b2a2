//! Payment-proof intake: photos and documents sent in private chats.

use teloxide::prelude::*;
use teloxide::types::{ChatKind, Message};

use crate::telegram::handlers::types::{HandlerDeps, HandlerResult};

/// True for messages that look like a payment confirmation: a photo or a
/// document sent in a private chat.
pub fn is_payment_proof(msg: &Message) -> bool {
    let has_attachment = msg.photo().is_some() || msg.document().is_some();
    has_attachment && matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Ledger tag for the attachment kind.
pub fn proof_method(msg: &Message) -> &'static str {
    if msg.photo().is_some() {
        "image"
    } else if msg.document().is_some() {
        "document"
    } else {
        "unknown"
    }
}

fn sender_username(msg: &Message) -> Option<String> {
    msg.from
        .as_ref()
        .and_then(|u| u.username.as_ref())
        .map(|name| format!("@{}", name))
}

pub async fn handle_payment_proof(bot: Bot, msg: Message, deps: HandlerDeps) -> HandlerResult {
    let chat_id = msg.chat.id;

    if !deps.rate_limiter.try_acquire(chat_id).await {
        log::info!("Proof from chat {} dropped by cooldown", chat_id);
        if let Err(e) = bot
            .send_message(chat_id, "⏳ Please wait a moment before sending another confirmation.")
            .await
        {
            log::error!("Failed to send cooldown notice to {}: {}", chat_id, e);
        }
        return Ok(());
    }

    let method = proof_method(&msg);
    let username = sender_username(&msg);
    log::info!(
        "Payment proof from chat {} ({}), method {}",
        chat_id,
        username.as_deref().unwrap_or("no username"),
        method
    );

    let reply = match deps
        .ledger
        .record_pending(chat_id.0, username.as_deref(), method)
    {
        Ok(()) => "✅ Confirmation received. It will be reviewed shortly. You will get the invite link once approved.",
        Err(e) => {
            log::error!("Failed to record payment proof for chat {}: {}", chat_id, e);
            "⚠️ We could not register your confirmation. Please send it again in a minute."
        }
    };

    if let Err(e) = bot.send_message(chat_id, reply).await {
        log::error!("Failed to acknowledge proof from {}: {}", chat_id, e);
    }
    Ok(())
}
