//! Dispatcher schema for the gateway bot.
//!
//! The same handler tree serves production webhook traffic and the
//! integration tests, so every branch is built from plain functions that
//! take their state through the dependency map.

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use crate::telegram::handlers::commands::{
    command_matches, handle_approve, handle_invite, handle_reject, handle_site, handle_start,
};
use crate::telegram::handlers::proofs::{handle_payment_proof, is_payment_proof};
use crate::telegram::handlers::types::{HandlerDeps, HandlerError, HandlerResult};
use crate::telegram::menu;

/// Builds the complete handler tree for the bot.
///
/// Review verbs come first so `/approve` with an attached caption can never
/// be shadowed by the proof branch; unmatched updates fall through and the
/// webhook ingress acks them anyway.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_start = deps.clone();
    let deps_site = deps.clone();
    let deps_invite = deps.clone();
    let deps_approve = deps.clone();
    let deps_reject = deps.clone();
    let deps_proofs = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        .branch(text_command("approve", move |bot, msg| {
            let deps = deps_approve.clone();
            async move { handle_approve(bot, msg, deps).await }
        }))
        .branch(text_command("reject", move |bot, msg| {
            let deps = deps_reject.clone();
            async move { handle_reject(bot, msg, deps).await }
        }))
        .branch(text_command("start", move |bot, msg| {
            let deps = deps_start.clone();
            async move { handle_start(bot, msg, deps).await }
        }))
        .branch(text_command("site", move |bot, msg| {
            let deps = deps_site.clone();
            async move { handle_site(bot, msg, deps).await }
        }))
        .branch(text_command("invite", move |bot, msg| {
            let deps = deps_invite.clone();
            async move { handle_invite(bot, msg, deps).await }
        }))
        .branch(proof_handler(deps_proofs))
        .branch(callback_handler(deps_callback))
}

/// Message branch matching `/name` (and `/name@Bot`) at the start of the text.
fn text_command<F, Fut>(name: &'static str, endpoint: F) -> UpdateHandler<HandlerError>
where
    F: Fn(Bot, Message) -> Fut + Send + Sync + Clone + 'static,
    Fut: std::future::Future<Output = HandlerResult> + Send + 'static,
{
    Update::filter_message()
        .filter(move |msg: Message| {
            msg.text().is_some_and(|t| command_matches(t, name))
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let endpoint = endpoint.clone();
            async move { endpoint(bot, msg).await }
        })
}

/// Photos and documents sent in private chats are treated as payment proofs.
fn proof_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| is_payment_proof(&msg))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { handle_payment_proof(bot, msg, deps).await }
        })
}

/// Menu button presses: answer the query, then send the matching panel.
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
                log::warn!("Failed to answer callback query {:?}: {}", q.id, e);
            }

            let Some(chat_id) = q.message.as_ref().map(|m| m.chat().id) else {
                log::debug!("Callback query {:?} without an attached message", q.id);
                return Ok(());
            };

            let tag = q.data.as_deref().unwrap_or_default();
            match menu::panel_text(tag, &deps.config) {
                Some(text) => {
                    if let Err(e) = bot.send_message(chat_id, text).await {
                        log::error!("Failed to send panel '{}' to {}: {}", tag, chat_id, e);
                    }
                }
                None => log::warn!("Unknown callback tag '{}' from chat {}", tag, chat_id),
            }
            Ok(())
        }
    })
}
