//! Rate limiting middleware
//!
//! In-memory sliding-window limiter used by the storage-backed access
//! policy. State is per-process; restarting the bot resets all windows.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::warn;

use crate::config::Settings;

#[derive(Debug, Clone)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    entries: Arc<Mutex<HashMap<i64, Vec<Instant>>>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.rate_limit_requests,
            Duration::from_secs(settings.rate_limit_window),
        )
    }

    /// Record a request for the user and report whether they are over the
    /// limit for the current window.
    pub fn is_limited(&self, telegram_id: i64) -> bool {
        let now = Instant::now();
        let cutoff = now.checked_sub(self.window);
        let mut entries = self.entries.lock().unwrap();

        // Prune expired timestamps everywhere and evict users whose whole
        // window expired, so the map does not grow with every sender ever
        // seen
        if let Some(cutoff) = cutoff {
            entries.retain(|_, timestamps| {
                timestamps.retain(|&t| t > cutoff);
                !timestamps.is_empty()
            });
        }

        let requests = entries.entry(telegram_id).or_default();
        if requests.len() as u32 >= self.max_requests {
            warn!(telegram_id = telegram_id, "Rate limit exceeded");
            return true;
        }

        requests.push(now);
        false
    }

    /// Number of users currently holding an active window
    pub fn tracked_users(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        assert!(!limiter.is_limited(1));
        assert!(!limiter.is_limited(1));
        assert!(!limiter.is_limited(1));
        assert!(limiter.is_limited(1));
    }

    #[test]
    fn test_windows_are_per_user() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(!limiter.is_limited(1));
        assert!(!limiter.is_limited(2));
        assert!(limiter.is_limited(1));
    }

    #[test]
    fn test_window_expiry_frees_slots() {
        let limiter = RateLimiter::new(1, Duration::from_millis(20));
        assert!(!limiter.is_limited(1));
        assert!(limiter.is_limited(1));
        std::thread::sleep(Duration::from_millis(30));
        assert!(!limiter.is_limited(1));
    }

    #[test]
    fn test_idle_users_are_evicted() {
        let limiter = RateLimiter::new(5, Duration::from_millis(20));
        assert!(!limiter.is_limited(1));
        assert!(!limiter.is_limited(2));
        assert_eq!(limiter.tracked_users(), 2);

        std::thread::sleep(Duration::from_millis(30));

        // A request from one user sweeps the others' expired windows
        assert!(!limiter.is_limited(3));
        assert_eq!(limiter.tracked_users(), 1);
    }
}
