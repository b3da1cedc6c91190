//! User service implementation
//!
//! CRUD operations over the user repository with the crate's failure
//! policy applied at the operation boundary: persistence errors are
//! logged with context and surfaced as `None` / `false` / empty results,
//! never propagated. Callers must treat an empty result as "operation did
//! not take effect".

use teloxide::types::User as TelegramUser;
use tracing::{debug, error, info, warn};

use crate::database::repositories::UserRepository;
use crate::models::user::{ActivityKind, CreateUserRequest, UpdateUserRequest, User, UserStats};

/// User service for managing user operations
#[derive(Debug, Clone)]
pub struct UserService {
    user_repository: UserRepository,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(user_repository: UserRepository) -> Self {
        Self { user_repository }
    }

    /// Get user by Telegram ID
    pub async fn get_by_telegram_id(&self, telegram_id: i64) -> Option<User> {
        match self.user_repository.find_by_telegram_id(telegram_id).await {
            Ok(user) => user,
            Err(e) => {
                error!(error = %e, telegram_id = telegram_id, "Error getting user by telegram_id");
                None
            }
        }
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Option<User> {
        match self.user_repository.find_by_username(username).await {
            Ok(user) => user,
            Err(e) => {
                error!(error = %e, username = username, "Error getting user by username");
                None
            }
        }
    }

    /// Create a new user from Telegram user data
    pub async fn create(&self, tg_user: &TelegramUser) -> Option<User> {
        let request = CreateUserRequest::from(tg_user);
        let telegram_id = request.telegram_id;

        match self.user_repository.create(request).await {
            Ok(user) => {
                info!(user_id = user.id, telegram_id = telegram_id, "User created");
                Some(user)
            }
            Err(e) => {
                error!(error = %e, telegram_id = telegram_id, "Error creating user");
                None
            }
        }
    }

    /// Update user fields
    pub async fn update(&self, telegram_id: i64, patch: UpdateUserRequest) -> Option<User> {
        match self.user_repository.update(telegram_id, patch).await {
            Ok(user) => {
                info!(user_id = user.id, telegram_id = telegram_id, "User updated");
                Some(user)
            }
            Err(e) => {
                error!(error = %e, telegram_id = telegram_id, "Error updating user");
                None
            }
        }
    }

    /// Get an existing user or create a new one: an idempotent upsert
    /// keyed on telegram_id.
    ///
    /// When the user exists, only the subset of profile fields that differ
    /// from the transport data is persisted; an unchanged profile writes
    /// nothing.
    pub async fn get_or_create(&self, tg_user: &TelegramUser) -> Option<User> {
        let telegram_id = tg_user.id.0 as i64;
        debug!(telegram_id = telegram_id, "Looking up or creating user");

        match self.get_by_telegram_id(telegram_id).await {
            Some(existing) => {
                let patch = existing.profile_diff(tg_user);
                if patch.is_empty() {
                    Some(existing)
                } else {
                    self.update(telegram_id, patch).await
                }
            }
            None => self.create(tg_user).await,
        }
    }

    /// Record one counted inbound update.
    ///
    /// Call exactly once per update that should count toward usage
    /// statistics.
    pub async fn update_activity(&self, telegram_id: i64, kind: ActivityKind) -> Option<User> {
        match self.user_repository.record_activity(telegram_id, kind).await {
            Ok(user) => Some(user),
            Err(e) => {
                error!(
                    error = %e,
                    telegram_id = telegram_id,
                    kind = kind.as_str(),
                    "Error updating user activity"
                );
                None
            }
        }
    }

    /// Get active users within the specified number of days
    pub async fn get_active_users(&self, since_days: i32) -> Vec<User> {
        match self.user_repository.list_active_since(since_days).await {
            Ok(users) => users,
            Err(e) => {
                error!(error = %e, since_days = since_days, "Error getting active users");
                Vec::new()
            }
        }
    }

    /// Get aggregate usage statistics
    pub async fn get_stats(&self) -> Option<UserStats> {
        match self.user_repository.stats().await {
            Ok(stats) => Some(stats),
            Err(e) => {
                error!(error = %e, "Error getting user statistics");
                None
            }
        }
    }

    /// Block a user
    pub async fn block(&self, telegram_id: i64) -> Option<User> {
        self.set_blocked(telegram_id, true).await
    }

    /// Unblock a user
    pub async fn unblock(&self, telegram_id: i64) -> Option<User> {
        self.set_blocked(telegram_id, false).await
    }

    async fn set_blocked(&self, telegram_id: i64, blocked: bool) -> Option<User> {
        match self.user_repository.set_blocked(telegram_id, blocked).await {
            Ok(user) => {
                if blocked {
                    warn!(telegram_id = telegram_id, "User blocked");
                } else {
                    info!(telegram_id = telegram_id, "User unblocked");
                }
                Some(user)
            }
            Err(e) => {
                error!(error = %e, telegram_id = telegram_id, blocked = blocked, "Error setting block status");
                None
            }
        }
    }

    /// Grant admin privileges
    pub async fn make_admin(&self, telegram_id: i64) -> Option<User> {
        self.set_admin(telegram_id, true).await
    }

    /// Revoke admin privileges
    pub async fn remove_admin(&self, telegram_id: i64) -> Option<User> {
        self.set_admin(telegram_id, false).await
    }

    async fn set_admin(&self, telegram_id: i64, admin: bool) -> Option<User> {
        match self.user_repository.set_admin(telegram_id, admin).await {
            Ok(user) => {
                warn!(telegram_id = telegram_id, is_admin = admin, "Admin status changed");
                Some(user)
            }
            Err(e) => {
                error!(error = %e, telegram_id = telegram_id, "Error setting admin status");
                None
            }
        }
    }

    /// Delete a user. Deletion is an explicit administrative action; users
    /// are never removed automatically.
    pub async fn delete(&self, telegram_id: i64) -> bool {
        match self.user_repository.delete(telegram_id).await {
            Ok(deleted) => {
                if deleted {
                    info!(telegram_id = telegram_id, "User deleted");
                }
                deleted
            }
            Err(e) => {
                error!(error = %e, telegram_id = telegram_id, "Error deleting user");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;
    use teloxide::types::UserId;

    // Integration tests run against DATABASE_TEST_URL when it is set and
    // silently skip otherwise, so the suite passes without a database.
    async fn test_service() -> Option<UserService> {
        let url = std::env::var("DATABASE_TEST_URL").ok()?;
        let pool = PgPoolOptions::new().connect(&url).await.ok()?;
        sqlx::migrate!("./migrations").run(&pool).await.ok()?;
        Some(UserService::new(UserRepository::new(pool)))
    }

    fn tg_user(id: u64, username: Option<&str>) -> TelegramUser {
        TelegramUser {
            id: UserId(id),
            is_bot: false,
            first_name: "Test".to_string(),
            last_name: None,
            username: username.map(str::to_string),
            language_code: Some("en".to_string()),
            is_premium: false,
            added_to_attachment_menu: false,
        }
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let Some(service) = test_service().await else {
            return;
        };

        let user = tg_user(900_001, Some("idempotent"));
        let first = service.get_or_create(&user).await.unwrap();
        let second = service.get_or_create(&user).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.updated_at, second.updated_at);

        service.delete(first.telegram_id).await;
    }

    #[tokio::test]
    async fn test_get_or_create_patches_changed_username() {
        let Some(service) = test_service().await else {
            return;
        };

        let user = tg_user(900_002, Some("before"));
        let created = service.get_or_create(&user).await.unwrap();

        let renamed = tg_user(900_002, Some("after"));
        let updated = service.get_or_create(&renamed).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.username.as_deref(), Some("after"));
        assert_eq!(updated.first_name, created.first_name);

        service.delete(created.telegram_id).await;
    }

    #[tokio::test]
    async fn test_get_or_create_clears_removed_username() {
        let Some(service) = test_service().await else {
            return;
        };

        let user = tg_user(900_009, Some("ephemeral"));
        let created = service.get_or_create(&user).await.unwrap();
        assert_eq!(created.username.as_deref(), Some("ephemeral"));

        // The user deletes their username upstream; the stored value must
        // be cleared, not kept
        let anonymous = tg_user(900_009, None);
        let updated = service.get_or_create(&anonymous).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert!(updated.username.is_none());
        assert!(service.get_by_username("ephemeral").await.is_none());

        service.delete(created.telegram_id).await;
    }

    #[tokio::test]
    async fn test_concurrent_get_or_create_single_row() {
        let Some(service) = test_service().await else {
            return;
        };

        let user = tg_user(900_003, Some("racer"));
        let (a, b) = tokio::join!(service.get_or_create(&user), service.get_or_create(&user));

        let a = a.unwrap();
        let b = b.unwrap();
        assert_eq!(a.id, b.id);

        service.delete(a.telegram_id).await;
    }

    #[tokio::test]
    async fn test_find_by_username() {
        let Some(service) = test_service().await else {
            return;
        };

        let user = tg_user(900_005, Some("findable"));
        let created = service.get_or_create(&user).await.unwrap();

        let found = service.get_by_username("findable").await.unwrap();
        assert_eq!(found.id, created.id);
        assert!(service.get_by_username("missing_nobody").await.is_none());

        service.delete(created.telegram_id).await;
    }

    #[tokio::test]
    async fn test_block_toggles_active_flag() {
        let Some(service) = test_service().await else {
            return;
        };

        let user = tg_user(900_006, None);
        let created = service.get_or_create(&user).await.unwrap();
        assert!(created.is_active);
        assert!(!created.is_blocked);

        let blocked = service.block(created.telegram_id).await.unwrap();
        assert!(blocked.is_blocked);
        assert!(!blocked.is_active);

        let unblocked = service.unblock(created.telegram_id).await.unwrap();
        assert!(!unblocked.is_blocked);
        assert!(unblocked.is_active);

        service.delete(created.telegram_id).await;
    }

    #[tokio::test]
    async fn test_admin_grant_and_revoke() {
        let Some(service) = test_service().await else {
            return;
        };

        let user = tg_user(900_007, None);
        let created = service.get_or_create(&user).await.unwrap();
        assert!(!created.is_admin);

        let admin = service.make_admin(created.telegram_id).await.unwrap();
        assert!(admin.is_admin);

        let demoted = service.remove_admin(created.telegram_id).await.unwrap();
        assert!(!demoted.is_admin);

        service.delete(created.telegram_id).await;
    }

    #[tokio::test]
    async fn test_active_users_and_stats() {
        let Some(service) = test_service().await else {
            return;
        };

        let user = tg_user(900_008, Some("active_now"));
        let created = service.get_or_create(&user).await.unwrap();
        service
            .update_activity(created.telegram_id, ActivityKind::Message)
            .await
            .unwrap();

        let active = service.get_active_users(1).await;
        assert!(active.iter().any(|u| u.telegram_id == created.telegram_id));

        let stats = service.get_stats().await.unwrap();
        assert!(stats.total_users >= 1);
        assert!(stats.total_messages >= 1);

        service.delete(created.telegram_id).await;
    }

    #[tokio::test]
    async fn test_activity_counters_move_forward() {
        let Some(service) = test_service().await else {
            return;
        };

        let user = tg_user(900_004, None);
        let created = service.get_or_create(&user).await.unwrap();

        let after_msg = service
            .update_activity(created.telegram_id, ActivityKind::Message)
            .await
            .unwrap();
        let after_cmd = service
            .update_activity(created.telegram_id, ActivityKind::Command)
            .await
            .unwrap();

        assert_eq!(after_msg.message_count, created.message_count + 1);
        assert_eq!(after_cmd.command_count, created.command_count + 1);
        assert!(after_cmd.last_activity >= created.last_activity);

        service.delete(created.telegram_id).await;
    }
}
