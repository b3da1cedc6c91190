//! Middleware module
//!
//! Access gating and rate limiting applied before handlers run

pub mod auth;
pub mod rate_limit;

pub use auth::{AccessDecision, AccessPolicy, AuthGate, DenyReason, NoopAccessPolicy, ServiceAccessPolicy};
pub use rate_limit::RateLimiter;
