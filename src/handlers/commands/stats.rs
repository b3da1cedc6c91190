//! Stats command handler
//!
//! Exposes both rendering paths: service-backed statistics when the user
//! record loads, and the static placeholder otherwise.

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, Message, ParseMode, User as TelegramUser},
    Bot,
};

use crate::models::{ActivityKind, User, UserStats};
use crate::services::ServiceFactory;
use crate::utils::errors::Result;
use crate::utils::helpers::{format_timestamp, user_mention};
use crate::utils::logging::log_user_action;

/// Handle /stats command
pub async fn handle_stats(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let telegram_id = user.id.0 as i64;
    log_user_action(telegram_id, "stats_command", None);

    if services.users.get_or_create(user).await.is_some() {
        let _ = services
            .users
            .update_activity(telegram_id, ActivityKind::Command)
            .await;
    }

    // Re-read after the activity bump so this command shows up in its own
    // counter.
    let text = match services.users.get_by_telegram_id(telegram_id).await {
        Some(record) => {
            let totals = services.users.get_stats().await;
            render_stats(&record, totals.as_ref())
        }
        None => render_stats_placeholder(user),
    };

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(stats_keyboard())
        .await?;

    Ok(())
}

/// Render statistics from the stored user record
pub fn render_stats(record: &User, totals: Option<&UserStats>) -> String {
    let mut text = format!(
        "📊 <b>Usage Statistics</b>\n\n\
         👤 <b>User:</b> {}\n\
         🆔 <b>ID:</b> <code>{}</code>\n\n\
         📈 <b>Activity:</b>\n\
         • Messages sent: {}\n\
         • Commands used: {}\n\
         • Member since: {}\n\
         • Last activity: {}",
        record.mention(),
        record.telegram_id,
        record.message_count,
        record.command_count,
        format_timestamp(record.created_at),
        format_timestamp(record.last_activity),
    );

    if let Some(totals) = totals {
        text.push_str(&format!(
            "\n\n🌍 <b>Community:</b>\n\
             • Total users: {}\n\
             • Active users: {}\n\
             • Messages processed: {}",
            totals.total_users, totals.active_users, totals.total_messages
        ));
    }

    text
}

/// Render the static placeholder shown when no record is available
pub fn render_stats_placeholder(user: &TelegramUser) -> String {
    format!(
        "📊 <b>Usage Statistics</b>\n\n\
         👤 <b>User:</b> {}\n\
         🆔 <b>ID:</b> <code>{}</code>\n\n\
         📈 <b>Activity:</b>\n\
         • Messages sent: 0\n\
         • Commands used: 0\n\
         • Last activity: First time!\n\n\
         🏆 <b>Achievements:</b>\n\
         • New User 🎉\n\n\
         Keep using the bot to unlock more achievements!",
        user_mention(user),
        user.id.0
    )
}

fn stats_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "🔄 Refresh",
        "stats",
    )]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use teloxide::types::UserId;

    fn record() -> User {
        User {
            id: 1,
            telegram_id: 42,
            first_name: "Ada".to_string(),
            last_name: None,
            username: None,
            language_code: None,
            is_active: true,
            is_admin: false,
            is_premium: false,
            is_blocked: false,
            last_activity: Utc::now(),
            message_count: 15,
            command_count: 4,
            preferred_language: "en".to_string(),
            timezone: "UTC".to_string(),
            notifications_enabled: true,
            bio: None,
            profile_photo_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_stats_uses_record_counters() {
        let text = render_stats(&record(), None);
        assert!(text.contains("Messages sent: 15"));
        assert!(text.contains("Commands used: 4"));
        assert!(!text.contains("Community"));
    }

    #[test]
    fn test_render_stats_appends_totals() {
        let totals = UserStats {
            total_users: 100,
            active_users: 60,
            blocked_users: 2,
            admin_users: 3,
            total_messages: 5000,
            total_commands: 800,
        };

        let text = render_stats(&record(), Some(&totals));
        assert!(text.contains("Total users: 100"));
        assert!(text.contains("Messages processed: 5000"));
    }

    #[test]
    fn test_render_placeholder() {
        let user = TelegramUser {
            id: UserId(9),
            is_bot: false,
            first_name: "New".to_string(),
            last_name: None,
            username: None,
            language_code: None,
            is_premium: false,
            added_to_attachment_menu: false,
        };

        let text = render_stats_placeholder(&user);
        assert!(text.contains("Messages sent: 0"));
        assert!(text.contains("New User 🎉"));
    }
}
