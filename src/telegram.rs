//! Telegram Bot transport
//!
//! Long-polls Telegram, turns each command message into a `CallerIdentity`
//! plus `CommandInvocation`, and sends the router's reply back to the chat.
//!
//! Uses explicit Dispatcher pattern for reliable message polling.

use anyhow::Result;
use std::sync::Arc;
use teloxide::{
    dispatching::{Dispatcher, UpdateFilterExt},
    dptree,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    types::{BotCommand, Update},
};

use crate::format::chunk_message;
use crate::record::CallerIdentity;
use crate::router::CommandRouter;

struct BotData {
    router: CommandRouter,
    bot_username: Option<String>,
}

/// Run the bot until the dispatcher stops (Ctrl-C)
pub async fn run_telegram_bot(token: &str, router: CommandRouter) -> Result<()> {
    tracing::info!("===========================================");
    tracing::info!("  RecordBot Telegram - Starting...");
    tracing::info!("===========================================");

    let bot = Bot::new(token);

    // Verify bot token by calling getMe
    tracing::info!("Verifying bot token...");
    let bot_username = match bot.get_me().await {
        Ok(me) => {
            tracing::info!(
                "Bot authenticated: @{} (ID: {})",
                me.user.username.as_deref().unwrap_or("unknown"),
                me.user.id
            );
            me.user.username.clone()
        }
        Err(e) => {
            tracing::error!("Failed to authenticate bot: {}", e);
            anyhow::bail!("Bot authentication failed: {}", e);
        }
    };

    // Delete any existing webhook to ensure polling works
    tracing::info!("Clearing webhook (if any)...");
    if let Err(e) = bot.delete_webhook().await {
        tracing::warn!("Failed to delete webhook: {} (continuing anyway)", e);
    }

    let menu: Vec<BotCommand> = router
        .commands()
        .into_iter()
        .map(|(name, description)| BotCommand::new(name, description))
        .collect();
    if let Err(e) = bot.set_my_commands(menu).await {
        tracing::warn!("Failed to register command menu: {}", e);
    }

    let handler_data = Arc::new(BotData {
        router,
        bot_username,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(message_handler));

    tracing::info!("Starting dispatcher with long polling...");
    tracing::info!("  Bot is now LIVE - send a command!");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![handler_data])
        .default_handler(|upd| async move {
            tracing::debug!("Unhandled update: {:?}", upd);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "Error in message handler",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::warn!("Dispatcher stopped");
    Ok(())
}

/// Message handler endpoint for the dispatcher
async fn message_handler(bot: Bot, msg: Message, data: Arc<BotData>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(caller) = caller_identity(&msg) else {
        tracing::debug!("Ignoring message without sender in chat {}", msg.chat.id);
        return Ok(());
    };

    let reply = data
        .router
        .dispatch_text(text, data.bot_username.as_deref(), &caller)
        .await;

    if let Some(reply) = reply {
        send_reply(&bot, msg.chat.id, &reply).await?;
    }

    Ok(())
}

/// Extract the caller tuple from an inbound message
fn caller_identity(msg: &Message) -> Option<CallerIdentity> {
    let user = msg.from.as_ref()?;
    Some(CallerIdentity {
        user_id: user.id.0 as i64,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        chat_id: msg.chat.id.0,
    })
}

async fn send_reply(bot: &Bot, chat_id: ChatId, text: &str) -> ResponseResult<()> {
    for chunk in chunk_message(text) {
        bot.send_message(chat_id, chunk).await?;
    }
    Ok(())
}
