//! Services module
//!
//! This module contains business logic services

pub mod user;

pub use user::UserService;

use std::sync::Arc;

use crate::config::Settings;
use crate::database::repositories::UserRepository;
use crate::middleware::{AccessPolicy, AuthGate, RateLimiter, ServiceAccessPolicy};

/// Service factory wiring the user service and the access gate together
#[derive(Clone)]
pub struct ServiceFactory {
    pub users: UserService,
    pub gate: AuthGate,
}

impl ServiceFactory {
    /// Create a factory with the storage-backed access policy
    pub fn new(settings: &Settings, user_repository: UserRepository) -> Self {
        let users = UserService::new(user_repository);
        let policy = ServiceAccessPolicy::new(users.clone(), RateLimiter::from_settings(settings));

        Self {
            gate: AuthGate::new(settings, Arc::new(policy)),
            users,
        }
    }

    /// Create a factory with a custom access policy
    pub fn with_policy(
        settings: &Settings,
        user_repository: UserRepository,
        policy: Arc<dyn AccessPolicy>,
    ) -> Self {
        Self {
            users: UserService::new(user_repository),
            gate: AuthGate::new(settings, policy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::NoopAccessPolicy;
    use sqlx::postgres::PgPoolOptions;
    use teloxide::types::{User as TelegramUser, UserId};

    fn lazy_repository() -> UserRepository {
        // connect_lazy never touches the database; the permissive policy
        // below keeps the gate from querying it either
        let pool = PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/echobuddy_test")
            .unwrap();
        UserRepository::new(pool)
    }

    #[tokio::test]
    async fn test_with_policy_swaps_the_gate_policy() {
        let settings = Settings::default();
        let factory =
            ServiceFactory::with_policy(&settings, lazy_repository(), Arc::new(NoopAccessPolicy));

        let user = TelegramUser {
            id: UserId(1),
            is_bot: false,
            first_name: "Test".to_string(),
            last_name: None,
            username: None,
            language_code: None,
            is_premium: false,
            added_to_attachment_menu: false,
        };

        assert!(factory.gate.check_user_access(Some(&user)).await.is_allowed());
    }
}
