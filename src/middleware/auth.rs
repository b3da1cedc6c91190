//! Authentication middleware
//!
//! Access gating is explicit composition: the dispatcher asks the gate
//! for a decision before invoking a handler, instead of wrapping handler
//! functions. The underlying blocked/admin/rate-limit checks live behind
//! the pluggable [`AccessPolicy`] trait so the no-op default is visible
//! and swappable.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use teloxide::types::User as TelegramUser;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::middleware::rate_limit::RateLimiter;
use crate::services::user::UserService;

/// Pluggable access checks consulted by the gate.
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    async fn is_blocked(&self, telegram_id: i64) -> bool;
    async fn is_admin(&self, telegram_id: i64) -> bool;
    async fn is_rate_limited(&self, telegram_id: i64) -> bool;
}

/// Policy that allows everything: never blocked, never admin, never
/// limited. Mirrors the historical stub behavior and serves as the
/// default for integrations without storage.
#[derive(Debug, Clone, Default)]
pub struct NoopAccessPolicy;

#[async_trait]
impl AccessPolicy for NoopAccessPolicy {
    async fn is_blocked(&self, _telegram_id: i64) -> bool {
        false
    }

    async fn is_admin(&self, _telegram_id: i64) -> bool {
        false
    }

    async fn is_rate_limited(&self, _telegram_id: i64) -> bool {
        false
    }
}

/// Policy answering from the user store plus an in-memory rate limiter.
#[derive(Debug, Clone)]
pub struct ServiceAccessPolicy {
    users: UserService,
    limiter: RateLimiter,
}

impl ServiceAccessPolicy {
    pub fn new(users: UserService, limiter: RateLimiter) -> Self {
        Self { users, limiter }
    }
}

#[async_trait]
impl AccessPolicy for ServiceAccessPolicy {
    async fn is_blocked(&self, telegram_id: i64) -> bool {
        self.users
            .get_by_telegram_id(telegram_id)
            .await
            .map(|u| u.is_blocked)
            .unwrap_or(false)
    }

    async fn is_admin(&self, telegram_id: i64) -> bool {
        self.users
            .get_by_telegram_id(telegram_id)
            .await
            .map(|u| u.is_admin)
            .unwrap_or(false)
    }

    async fn is_rate_limited(&self, telegram_id: i64) -> bool {
        self.limiter.is_limited(telegram_id)
    }
}

/// Why a gate denied an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Update carries no sender identity; handled as a silent no-op.
    NoSender,
    Blocked,
    RateLimited,
    NotAdmin,
}

impl DenyReason {
    /// Canned reply for the denied user, `None` when the denial is silent
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            DenyReason::NoSender => None,
            DenyReason::Blocked => Some("❌ Access denied."),
            DenyReason::RateLimited => Some("❌ Too many requests. Please slow down."),
            DenyReason::NotAdmin => Some("❌ Admin access required."),
        }
    }
}

/// Gate outcome, returned to the dispatcher before a handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }
}

/// Access gate holding the static admin allowlist and the active policy.
#[derive(Clone)]
pub struct AuthGate {
    admin_ids: HashSet<i64>,
    policy: Arc<dyn AccessPolicy>,
}

impl AuthGate {
    pub fn new(settings: &Settings, policy: Arc<dyn AccessPolicy>) -> Self {
        Self {
            admin_ids: settings.admin_ids.iter().copied().collect(),
            policy,
        }
    }

    /// Check whether the sender may use the bot at all
    pub async fn check_user_access(&self, user: Option<&TelegramUser>) -> AccessDecision {
        let Some(user) = user else {
            warn!("No user found in update");
            return AccessDecision::Denied(DenyReason::NoSender);
        };

        let telegram_id = user.id.0 as i64;

        if self.policy.is_blocked(telegram_id).await {
            warn!(telegram_id = telegram_id, "Blocked user attempted access");
            return AccessDecision::Denied(DenyReason::Blocked);
        }

        if self.policy.is_rate_limited(telegram_id).await {
            return AccessDecision::Denied(DenyReason::RateLimited);
        }

        debug!(telegram_id = telegram_id, username = ?user.username, "User access granted");
        AccessDecision::Allowed
    }

    /// Check whether the sender has admin privileges, either through the
    /// static allowlist or the storage-backed flag
    pub async fn check_admin_access(&self, user: Option<&TelegramUser>) -> AccessDecision {
        let Some(user) = user else {
            return AccessDecision::Denied(DenyReason::NoSender);
        };

        let telegram_id = user.id.0 as i64;

        if self.admin_ids.contains(&telegram_id) {
            debug!(telegram_id = telegram_id, "Admin access granted (static list)");
            return AccessDecision::Allowed;
        }

        if self.policy.is_admin(telegram_id).await {
            debug!(telegram_id = telegram_id, "Admin access granted (storage)");
            return AccessDecision::Allowed;
        }

        warn!(telegram_id = telegram_id, "Admin access denied");
        AccessDecision::Denied(DenyReason::NotAdmin)
    }
}
