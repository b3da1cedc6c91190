//! Help command handler

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, Message, ParseMode},
    Bot,
};

use crate::models::ActivityKind;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;
use crate::utils::logging::log_user_action;

/// Handle /help command
pub async fn handle_help(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let telegram_id = user.id.0 as i64;
    log_user_action(telegram_id, "help_command", None);

    if services.users.get_or_create(user).await.is_some() {
        let _ = services
            .users
            .update_activity(telegram_id, ActivityKind::Command)
            .await;
    }

    bot.send_message(msg.chat.id, render_help())
        .parse_mode(ParseMode::Html)
        .reply_markup(help_keyboard())
        .await?;

    Ok(())
}

/// Render the help message
pub fn render_help() -> String {
    "🤖 <b>Bot Commands</b>\n\n\
     📋 <b>General Commands:</b>\n\
     • /start - Start the bot and see welcome message\n\
     • /help - Show this help message\n\
     • /settings - Configure your preferences\n\
     • /stats - View your usage statistics\n\n\
     💬 <b>Message Processing:</b>\n\
     • Send text messages for processing\n\
     • Send photos for analysis\n\
     • Send documents for processing\n\
     • Send voice messages for transcription\n\n\
     🔧 <b>Tips:</b>\n\
     • Use inline keyboards for quick actions\n\
     • Check your settings regularly\n\
     • Report bugs or suggestions to the developer\n\n\
     Need more help? Contact the developer!"
        .to_string()
}

fn help_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("⚙️ Settings", "settings"),
        InlineKeyboardButton::callback("📊 Stats", "stats"),
    ]])
}
