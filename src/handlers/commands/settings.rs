//! Settings command handler

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, Message, ParseMode},
    Bot,
};

use crate::models::{ActivityKind, User};
use crate::services::ServiceFactory;
use crate::utils::errors::Result;
use crate::utils::logging::log_user_action;

/// Handle /settings command
pub async fn handle_settings(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let telegram_id = user.id.0 as i64;
    log_user_action(telegram_id, "settings_command", None);

    let record = services.users.get_or_create(user).await;
    if record.is_some() {
        let _ = services
            .users
            .update_activity(telegram_id, ActivityKind::Command)
            .await;
    }

    bot.send_message(msg.chat.id, render_settings(record.as_ref()))
        .parse_mode(ParseMode::Html)
        .reply_markup(settings_keyboard())
        .await?;

    Ok(())
}

/// Render the settings overview, from the stored record when available
pub fn render_settings(record: Option<&User>) -> String {
    let (language, notifications, timezone) = match record {
        Some(user) => (
            user.preferred_language.clone(),
            if user.notifications_enabled {
                "Enabled"
            } else {
                "Disabled"
            },
            user.timezone.clone(),
        ),
        None => ("en".to_string(), "Enabled", "UTC".to_string()),
    };

    format!(
        "⚙️ <b>Bot Settings</b>\n\n\
         🔧 <b>Current Settings:</b>\n\
         • Language: {language}\n\
         • Notifications: {notifications}\n\
         • Timezone: {timezone}\n\
         • Response Format: HTML\n\n\
         Use the buttons below to modify your settings."
    )
}

fn settings_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("🌐 Language", "setting_language")],
        vec![InlineKeyboardButton::callback("🔔 Notifications", "setting_notifications")],
        vec![InlineKeyboardButton::callback("🔒 Privacy", "setting_privacy")],
        vec![InlineKeyboardButton::callback("📝 Format", "setting_format")],
        vec![InlineKeyboardButton::callback("🔄 Reset", "setting_reset")],
    ])
}
