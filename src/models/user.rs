//! User model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use teloxide::types::User as TelegramUser;

use crate::utils::helpers::escape_html;

/// Persisted Telegram user record.
///
/// `telegram_id` is the stable external identity and never changes after
/// creation. The activity counters only move up and `last_activity` only
/// moves forward.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub telegram_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,

    pub is_active: bool,
    pub is_admin: bool,
    pub is_premium: bool,
    pub is_blocked: bool,

    pub last_activity: DateTime<Utc>,
    pub message_count: i32,
    pub command_count: i32,

    pub preferred_language: String,
    pub timezone: String,
    pub notifications_enabled: bool,

    pub bio: Option<String>,
    pub profile_photo_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Get the user's full name
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }

    /// Get the user's display name (username if set, full name otherwise)
    pub fn display_name(&self) -> String {
        match &self.username {
            Some(username) => format!("@{}", username),
            None => self.full_name(),
        }
    }

    /// HTML mention deep link for this user
    pub fn mention(&self) -> String {
        format!(
            "<a href=\"tg://user?id={}\">{}</a>",
            self.telegram_id,
            escape_html(&self.first_name)
        )
    }

    /// Check if the user was active within the last `days` days
    pub fn is_recently_active(&self, days: i64) -> bool {
        self.last_activity > Utc::now() - Duration::days(days)
    }

    /// Diff the stored profile against the latest transport data.
    ///
    /// Returns a patch holding only the fields that changed, so the upsert
    /// writes nothing when the upstream profile is unchanged. A field the
    /// user removed upstream (username deleted, last name cleared) lands in
    /// the patch as an explicit `Some(None)` and is persisted as NULL.
    pub fn profile_diff(&self, tg_user: &TelegramUser) -> UpdateUserRequest {
        let mut patch = UpdateUserRequest::default();

        if self.first_name != tg_user.first_name {
            patch.first_name = Some(tg_user.first_name.clone());
        }
        if self.last_name != tg_user.last_name {
            patch.last_name = Some(tg_user.last_name.clone());
        }
        if self.username != tg_user.username {
            patch.username = Some(tg_user.username.clone());
        }
        if self.language_code != tg_user.language_code {
            patch.language_code = Some(tg_user.language_code.clone());
        }

        patch
    }
}

/// Which activity counter an update feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Message,
    Command,
}

impl ActivityKind {
    /// Column holding the counter for this activity kind
    pub fn counter_column(&self) -> &'static str {
        match self {
            ActivityKind::Message => "message_count",
            ActivityKind::Command => "command_count",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Message => "message",
            ActivityKind::Command => "command",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub telegram_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
    pub is_premium: bool,
}

impl From<&TelegramUser> for CreateUserRequest {
    fn from(tg_user: &TelegramUser) -> Self {
        Self {
            telegram_id: tg_user.id.0 as i64,
            first_name: tg_user.first_name.clone(),
            last_name: tg_user.last_name.clone(),
            username: tg_user.username.clone(),
            language_code: tg_user.language_code.clone(),
            is_premium: tg_user.is_premium,
        }
    }
}

/// Partial update for a stored user.
///
/// The outer `Option` means "field is part of the patch"; for nullable
/// columns the inner `Option` carries the new value, so `Some(None)`
/// clears the stored value while `None` leaves it untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<Option<String>>,
    pub username: Option<Option<String>>,
    pub language_code: Option<Option<String>>,
    pub preferred_language: Option<String>,
    pub timezone: Option<String>,
    pub notifications_enabled: Option<bool>,
    pub bio: Option<Option<String>>,
    pub profile_photo_url: Option<Option<String>>,
}

impl UpdateUserRequest {
    /// True when the patch carries no changes
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.username.is_none()
            && self.language_code.is_none()
            && self.preferred_language.is_none()
            && self.timezone.is_none()
            && self.notifications_enabled.is_none()
            && self.bio.is_none()
            && self.profile_photo_url.is_none()
    }
}

/// Aggregate user statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub total_users: i64,
    pub active_users: i64,
    pub blocked_users: i64,
    pub admin_users: i64,
    pub total_messages: i64,
    pub total_commands: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::UserId;

    fn stored_user() -> User {
        User {
            id: 1,
            telegram_id: 42,
            first_name: "Ada".to_string(),
            last_name: Some("Lovelace".to_string()),
            username: Some("ada".to_string()),
            language_code: Some("en".to_string()),
            is_active: true,
            is_admin: false,
            is_premium: false,
            is_blocked: false,
            last_activity: Utc::now(),
            message_count: 3,
            command_count: 1,
            preferred_language: "en".to_string(),
            timezone: "UTC".to_string(),
            notifications_enabled: true,
            bio: None,
            profile_photo_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn telegram_user() -> TelegramUser {
        TelegramUser {
            id: UserId(42),
            is_bot: false,
            first_name: "Ada".to_string(),
            last_name: Some("Lovelace".to_string()),
            username: Some("ada".to_string()),
            language_code: Some("en".to_string()),
            is_premium: false,
            added_to_attachment_menu: false,
        }
    }

    #[test]
    fn test_names() {
        let user = stored_user();
        assert_eq!(user.full_name(), "Ada Lovelace");
        assert_eq!(user.display_name(), "@ada");

        let mut no_username = stored_user();
        no_username.username = None;
        assert_eq!(no_username.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_profile_diff_unchanged_is_empty() {
        let patch = stored_user().profile_diff(&telegram_user());
        assert!(patch.is_empty());
    }

    #[test]
    fn test_profile_diff_username_only() {
        let mut tg_user = telegram_user();
        tg_user.username = Some("countess".to_string());

        let patch = stored_user().profile_diff(&tg_user);
        assert_eq!(patch.username, Some(Some("countess".to_string())));
        assert!(patch.first_name.is_none());
        assert!(patch.last_name.is_none());
        assert!(patch.language_code.is_none());
    }

    #[test]
    fn test_profile_diff_records_removed_username() {
        let mut tg_user = telegram_user();
        tg_user.username = None;

        // Deleting the username upstream is a change and must survive into
        // the patch as an explicit clear
        let patch = stored_user().profile_diff(&tg_user);
        assert!(!patch.is_empty());
        assert_eq!(patch.username, Some(None));
        assert!(patch.last_name.is_none());
    }

    #[test]
    fn test_profile_diff_records_removed_last_name() {
        let mut tg_user = telegram_user();
        tg_user.last_name = None;
        tg_user.language_code = None;

        let patch = stored_user().profile_diff(&tg_user);
        assert_eq!(patch.last_name, Some(None));
        assert_eq!(patch.language_code, Some(None));
        assert!(patch.username.is_none());
    }

    #[test]
    fn test_is_recently_active() {
        let mut user = stored_user();
        assert!(user.is_recently_active(7));

        user.last_activity = Utc::now() - Duration::days(30);
        assert!(!user.is_recently_active(7));
    }

    #[test]
    fn test_activity_kind_columns() {
        assert_eq!(ActivityKind::Message.counter_column(), "message_count");
        assert_eq!(ActivityKind::Command.counter_column(), "command_count");
    }
}
