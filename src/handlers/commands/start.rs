//! Start command handler

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, Message, ParseMode, User},
    Bot,
};

use crate::models::ActivityKind;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;
use crate::utils::helpers::user_mention;
use crate::utils::logging::log_user_action;

/// Handle /start command
pub async fn handle_start(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let telegram_id = user.id.0 as i64;
    log_user_action(telegram_id, "start_command", None);

    // Lazy upsert: first /start creates the record, later ones refresh it
    if services.users.get_or_create(user).await.is_some() {
        let _ = services
            .users
            .update_activity(telegram_id, ActivityKind::Command)
            .await;
    }

    bot.send_message(msg.chat.id, render_welcome(user))
        .parse_mode(ParseMode::Html)
        .reply_markup(start_keyboard())
        .await?;

    Ok(())
}

/// Render the welcome message
pub fn render_welcome(user: &User) -> String {
    format!(
        "👋 Welcome {}!\n\n\
         I'm a modern Telegram bot. Here's what I can do:\n\n\
         🔧 Commands:\n\
         • /help - Show this help message\n\
         • /settings - Configure bot settings\n\
         • /stats - View usage statistics\n\n\
         📝 I can also process your messages, photos, and documents!\n\n\
         Use /help to see all available commands.",
        user_mention(user)
    )
}

fn start_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("📚 Help", "help")],
        vec![InlineKeyboardButton::callback("⚙️ Settings", "settings")],
        vec![InlineKeyboardButton::callback("📊 Stats", "stats")],
    ])
}
