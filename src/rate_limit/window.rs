//! Fixed-window counter.
//!
//! # State Transitions
//! ```text
//! Open:    now - started_at <  window  → count in [0, limit]
//! Expired: now - started_at >= window  → next access restarts at now with count 0
//! ```
//!
//! Reset is lazy: nothing happens until the window is touched again.

use std::time::Duration;
use tokio::time::Instant;

use crate::config::LimitConfig;

/// Counter for one (scope, operation class) pair.
#[derive(Debug, Clone)]
pub struct RateLimitWindow {
    count: u32,
    started_at: Instant,
    limit: u32,
    window: Duration,
}

impl RateLimitWindow {
    pub fn new(limit: LimitConfig, now: Instant) -> Self {
        Self {
            count: 0,
            started_at: now,
            limit: limit.max_attempts,
            window: Duration::from_secs(limit.window_seconds),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= self.window
    }

    /// Restart the window if it has expired, picking up the current limit.
    fn refresh(&mut self, limit: LimitConfig, now: Instant) {
        if self.is_expired(now) {
            *self = Self::new(limit, now);
        }
    }

    /// Check-and-increment. Callers hold the window's lock across this call.
    pub fn try_acquire(&mut self, limit: LimitConfig, now: Instant) -> bool {
        self.refresh(limit, now);
        if self.count < self.limit {
            self.count += 1;
            true
        } else {
            false
        }
    }

    pub fn is_exceeded(&self, now: Instant) -> bool {
        !self.is_expired(now) && self.count >= self.limit
    }

    pub fn remaining(&self, now: Instant) -> u32 {
        if self.is_expired(now) {
            self.limit
        } else {
            self.limit.saturating_sub(self.count)
        }
    }

    /// Time until a slot frees; zero when one is already free.
    pub fn available_in(&self, now: Instant) -> Duration {
        if !self.is_exceeded(now) {
            return Duration::ZERO;
        }
        (self.started_at + self.window).saturating_duration_since(now)
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_window() {
        let start = Instant::now();
        let limit = LimitConfig::new(2, 10);
        let mut window = RateLimitWindow::new(limit, start);

        assert!(window.try_acquire(limit, start));
        assert!(window.try_acquire(limit, start + Duration::from_secs(3)));
        assert!(!window.try_acquire(limit, start + Duration::from_secs(4)));
        assert_eq!(window.count(), 2);
        assert_eq!(window.available_in(start + Duration::from_secs(4)), Duration::from_secs(6));

        // Exactly at the boundary the window is expired
        let later = start + Duration::from_secs(10);
        assert!(!window.is_exceeded(later));
        assert_eq!(window.remaining(later), 2);
        assert!(window.try_acquire(limit, later));
        assert_eq!(window.count(), 1);
    }

    #[test]
    fn test_new_limit_applies_on_reset() {
        let start = Instant::now();
        let mut window = RateLimitWindow::new(LimitConfig::new(1, 5), start);
        assert!(window.try_acquire(LimitConfig::new(1, 5), start));

        let bigger = LimitConfig::new(3, 5);
        assert!(!window.try_acquire(bigger, start));
        assert!(window.try_acquire(bigger, start + Duration::from_secs(5)));
        assert_eq!(window.limit(), 3);
    }
}
