//! User repository implementation

use sqlx::PgPool;

use crate::models::user::{ActivityKind, CreateUserRequest, UpdateUserRequest, User, UserStats};
use crate::utils::errors::BotError;

const USER_COLUMNS: &str = "id, telegram_id, first_name, last_name, username, language_code, \
     is_active, is_admin, is_premium, is_blocked, last_activity, message_count, command_count, \
     preferred_language, timezone, notifications_enabled, bio, profile_photo_url, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// Keyed on telegram_id with an on-conflict update, so two concurrent
    /// inserts for the same never-seen user produce exactly one row.
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, BotError> {
        let sql = format!(
            r#"
            INSERT INTO users (telegram_id, first_name, last_name, username, language_code,
                               is_premium, preferred_language)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (telegram_id) DO UPDATE
            SET first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                username = EXCLUDED.username,
                language_code = EXCLUDED.language_code,
                is_premium = EXCLUDED.is_premium,
                updated_at = NOW()
            RETURNING {USER_COLUMNS}
            "#
        );

        let preferred = request
            .language_code
            .clone()
            .unwrap_or_else(|| "en".to_string());

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(request.telegram_id)
            .bind(request.first_name)
            .bind(request.last_name)
            .bind(request.username)
            .bind(request.language_code)
            .bind(request.is_premium)
            .bind(preferred)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find user by Telegram ID
    pub async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, BotError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE telegram_id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(telegram_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find user by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, BotError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Apply a partial update; unset patch fields keep their stored values.
    ///
    /// The SET list is built from the fields actually present in the patch.
    /// A `Some(None)` on a nullable column writes NULL, clearing the stored
    /// value.
    pub async fn update(
        &self,
        telegram_id: i64,
        request: UpdateUserRequest,
    ) -> Result<User, BotError> {
        let mut query =
            sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE users SET updated_at = NOW()");

        if let Some(first_name) = request.first_name {
            query.push(", first_name = ").push_bind(first_name);
        }
        if let Some(last_name) = request.last_name {
            query.push(", last_name = ").push_bind(last_name);
        }
        if let Some(username) = request.username {
            query.push(", username = ").push_bind(username);
        }
        if let Some(language_code) = request.language_code {
            query.push(", language_code = ").push_bind(language_code);
        }
        if let Some(preferred_language) = request.preferred_language {
            query.push(", preferred_language = ").push_bind(preferred_language);
        }
        if let Some(timezone) = request.timezone {
            query.push(", timezone = ").push_bind(timezone);
        }
        if let Some(notifications_enabled) = request.notifications_enabled {
            query.push(", notifications_enabled = ").push_bind(notifications_enabled);
        }
        if let Some(bio) = request.bio {
            query.push(", bio = ").push_bind(bio);
        }
        if let Some(profile_photo_url) = request.profile_photo_url {
            query.push(", profile_photo_url = ").push_bind(profile_photo_url);
        }

        query.push(" WHERE telegram_id = ").push_bind(telegram_id);
        query.push(" RETURNING ");
        query.push(USER_COLUMNS);

        let user = query
            .build_query_as::<User>()
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    /// Bump the activity counter for `kind` and refresh last_activity.
    ///
    /// Increment happens in SQL so the counters stay monotonic under
    /// concurrent updates.
    pub async fn record_activity(
        &self,
        telegram_id: i64,
        kind: ActivityKind,
    ) -> Result<User, BotError> {
        let column = kind.counter_column();
        let sql = format!(
            r#"
            UPDATE users
            SET {column} = {column} + 1,
                last_activity = NOW(),
                updated_at = NOW()
            WHERE telegram_id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(telegram_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    /// Block or unblock a user; blocking also deactivates the account
    pub async fn set_blocked(&self, telegram_id: i64, is_blocked: bool) -> Result<User, BotError> {
        let sql = format!(
            r#"
            UPDATE users
            SET is_blocked = $2, is_active = NOT $2, updated_at = NOW()
            WHERE telegram_id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(telegram_id)
            .bind(is_blocked)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    /// Grant or revoke admin status
    pub async fn set_admin(&self, telegram_id: i64, is_admin: bool) -> Result<User, BotError> {
        let sql = format!(
            r#"
            UPDATE users
            SET is_admin = $2, updated_at = NOW()
            WHERE telegram_id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(telegram_id)
            .bind(is_admin)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    /// Delete a user record
    pub async fn delete(&self, telegram_id: i64) -> Result<bool, BotError> {
        let result = sqlx::query("DELETE FROM users WHERE telegram_id = $1")
            .bind(telegram_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Active users seen within the last `days` days
    pub async fn list_active_since(&self, days: i32) -> Result<Vec<User>, BotError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE last_activity > NOW() - make_interval(days => $1) AND is_active = TRUE \
             ORDER BY last_activity DESC"
        );

        let users = sqlx::query_as::<_, User>(&sql)
            .bind(days)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// Aggregate statistics over the whole users table
    pub async fn stats(&self) -> Result<UserStats, BotError> {
        let row: (i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE is_active),
                   COUNT(*) FILTER (WHERE is_blocked),
                   COUNT(*) FILTER (WHERE is_admin),
                   COALESCE(SUM(message_count), 0)::bigint,
                   COALESCE(SUM(command_count), 0)::bigint
            FROM users
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(UserStats {
            total_users: row.0,
            active_users: row.1,
            blocked_users: row.2,
            admin_users: row.3,
            total_messages: row.4,
            total_commands: row.5,
        })
    }
}
