//! Per-key fixed-window rate limiter.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use arc_swap::ArcSwap;
use dashmap::DashMap;

use crate::config::{LimitConfig, RateLimitConfig};
use crate::error::{GatewayError, Result};
use crate::lifecycle::Cancellation;
use crate::rate_limit::clock::{Clock, SystemClock};
use crate::rate_limit::window::RateLimitWindow;
use crate::routing::OperationClass;

/// Limit applied when neither the requested class nor "default" is configured.
const FALLBACK_LIMIT: LimitConfig = LimitConfig::new(60, 60);

/// Shortest sleep between polls in `wait`, so rounding never spins.
const MIN_POLL: Duration = Duration::from_millis(10);

type WindowKey = (String, String);

/// Fixed-window limiter keyed by (scope, operation class).
///
/// Each window has its own lock; unrelated keys never contend.
pub struct RateLimiter {
    windows: DashMap<WindowKey, Arc<Mutex<RateLimitWindow>>>,
    config: ArcSwap<RateLimitConfig>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: DashMap::new(),
            config: ArcSwap::from_pointee(config),
            clock,
        }
    }

    /// Swap limits. Open windows keep their limit until they reset.
    pub fn reconfigure(&self, config: RateLimitConfig) {
        self.config.store(Arc::new(config));
    }

    pub fn is_enabled(&self) -> bool {
        self.config.load().enabled
    }

    /// Limit configured for a class, falling back to "default".
    pub fn limit_for(&self, class: &str) -> LimitConfig {
        let config = self.config.load();
        config
            .limits
            .get(class)
            .or_else(|| config.limits.get(OperationClass::Default.as_str()))
            .copied()
            .unwrap_or(FALLBACK_LIMIT)
    }

    fn window(&self, scope: &str, class: &str) -> Arc<Mutex<RateLimitWindow>> {
        let key = (scope.to_string(), class.to_string());
        if let Some(window) = self.windows.get(&key) {
            return window.clone();
        }
        let limit = self.limit_for(class);
        let now = self.clock.now();
        self.windows
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(RateLimitWindow::new(limit, now))))
            .clone()
    }

    fn peek<T>(&self, scope: &str, class: &str, f: impl FnOnce(&RateLimitWindow) -> T) -> Option<T> {
        let window = self.windows.get(&(scope.to_string(), class.to_string()))?.clone();
        let guard = window.lock().unwrap_or_else(|e| e.into_inner());
        Some(f(&guard))
    }

    /// Take a slot if one is free. Check and increment happen under one lock.
    pub fn attempt(&self, scope: &str, class: &str) -> bool {
        if !self.is_enabled() {
            return true;
        }
        let limit = self.limit_for(class);
        let window = self.window(scope, class);
        let acquired = window
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .try_acquire(limit, self.clock.now());

        if !acquired {
            tracing::debug!(scope = %scope, class = %class, "Rate limit window full");
        }
        acquired
    }

    /// Read-only: is the window currently full?
    pub fn is_exceeded(&self, scope: &str, class: &str) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let now = self.clock.now();
        self.peek(scope, class, |w| w.is_exceeded(now)).unwrap_or(false)
    }

    /// Seconds until the window resets, rounded up; 0 if not exceeded.
    pub fn available_in(&self, scope: &str, class: &str) -> u64 {
        let wait = self.available_in_duration(scope, class);
        let secs = wait.as_secs();
        if wait.subsec_nanos() > 0 { secs + 1 } else { secs }
    }

    fn available_in_duration(&self, scope: &str, class: &str) -> Duration {
        if !self.is_enabled() {
            return Duration::ZERO;
        }
        let now = self.clock.now();
        self.peek(scope, class, |w| w.available_in(now)).unwrap_or(Duration::ZERO)
    }

    /// Slots left in the current window.
    pub fn remaining(&self, scope: &str, class: &str) -> u32 {
        let now = self.clock.now();
        self.peek(scope, class, |w| w.remaining(now))
            .unwrap_or_else(|| self.limit_for(class).max_attempts)
    }

    /// Reset one window, or every window of the scope when `class` is None.
    pub fn clear(&self, scope: &str, class: Option<&str>) {
        match class {
            Some(class) => {
                self.windows.remove(&(scope.to_string(), class.to_string()));
            }
            None => self.windows.retain(|(s, _), _| s != scope),
        }
    }

    /// Suspend until a slot is taken or `max_wait_secs` elapses (0 = unbounded).
    pub async fn wait(&self, scope: &str, class: &str, max_wait_secs: u64) -> bool {
        let deadline = (max_wait_secs > 0)
            .then(|| tokio::time::Instant::now() + Duration::from_secs(max_wait_secs));

        loop {
            if self.attempt(scope, class) {
                return true;
            }

            let mut pause = self.available_in_duration(scope, class).max(MIN_POLL);
            if let Some(deadline) = deadline {
                let left = deadline.saturating_duration_since(tokio::time::Instant::now());
                if left.is_zero() {
                    tracing::debug!(scope = %scope, class = %class, max_wait_secs, "Gave up waiting for rate limit slot");
                    return false;
                }
                pause = pause.min(left);
            }
            tokio::time::sleep(pause).await;
        }
    }

    /// `wait`, returning `Cancelled` as soon as `cancel` fires.
    pub async fn wait_cancellable(
        &self,
        scope: &str,
        class: &str,
        max_wait_secs: u64,
        cancel: &Cancellation,
    ) -> Result<bool> {
        tokio::select! {
            acquired = self.wait(scope, class, max_wait_secs) => Ok(acquired),
            _ = cancel.cancelled() => Err(GatewayError::Cancelled),
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("windows", &self.windows.len())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::clock::ManualClock;

    fn config(limit: u32, window_secs: u64) -> RateLimitConfig {
        let mut config = RateLimitConfig::default();
        config.limits.insert("messages".into(), LimitConfig::new(limit, window_secs));
        config
    }

    #[test]
    fn test_fourth_attempt_refused_until_window_resets() {
        let clock = Arc::new(ManualClock::new());
        let limiter = RateLimiter::with_clock(config(3, 60), clock.clone());

        assert!(limiter.attempt("default", "messages"));
        assert!(limiter.attempt("default", "messages"));
        assert!(limiter.attempt("default", "messages"));
        assert!(!limiter.attempt("default", "messages"));
        assert!(limiter.is_exceeded("default", "messages"));
        assert_eq!(limiter.remaining("default", "messages"), 0);
        assert_eq!(limiter.available_in("default", "messages"), 60);

        clock.advance(Duration::from_secs(61));
        assert!(!limiter.is_exceeded("default", "messages"));
        assert!(limiter.attempt("default", "messages"));
        assert_eq!(limiter.remaining("default", "messages"), 2);
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new(config(1, 60));
        assert!(limiter.attempt("a", "messages"));
        assert!(!limiter.attempt("a", "messages"));
        assert!(limiter.attempt("b", "messages"));
        assert!(limiter.attempt("a", "media"));
    }

    #[test]
    fn test_unknown_class_uses_default_limit() {
        let limiter = RateLimiter::new(config(1, 60));
        assert_eq!(limiter.limit_for("unheard-of"), LimitConfig::new(60, 60));
        assert_eq!(limiter.remaining("x", "unheard-of"), 60);
    }

    #[test]
    fn test_clear_one_or_all() {
        let limiter = RateLimiter::new(config(1, 60));
        limiter.attempt("a", "messages");
        limiter.attempt("a", "media");
        limiter.attempt("b", "messages");

        limiter.clear("a", Some("messages"));
        assert!(!limiter.is_exceeded("a", "messages"));
        assert_eq!(limiter.remaining("a", "media"), 9);

        limiter.clear("a", None);
        assert_eq!(limiter.remaining("a", "media"), 10);
        assert!(limiter.is_exceeded("b", "messages"));
    }

    #[test]
    fn test_disabled_never_refuses() {
        let mut cfg = config(1, 60);
        cfg.enabled = false;
        let limiter = RateLimiter::new(cfg);
        for _ in 0..10 {
            assert!(limiter.attempt("a", "messages"));
        }
        assert_eq!(limiter.available_in("a", "messages"), 0);
    }

    #[test]
    fn test_concurrent_attempts_never_exceed_limit() {
        let limiter = Arc::new(RateLimiter::new(config(50, 60)));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    (0..20).filter(|_| limiter.attempt("shared", "messages")).count()
                })
            })
            .collect();

        let granted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(granted, 50);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_window_resets() {
        let limiter = RateLimiter::new(config(1, 5));
        assert!(limiter.attempt("a", "messages"));

        let start = tokio::time::Instant::now();
        assert!(limiter.wait("a", "messages", 0).await);
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_gives_up_at_bound() {
        let limiter = RateLimiter::new(config(1, 60));
        assert!(limiter.attempt("a", "messages"));
        assert!(!limiter.wait("a", "messages", 2).await);
    }

    #[tokio::test]
    async fn test_wait_is_cancellable() {
        let limiter = RateLimiter::new(config(1, 60));
        assert!(limiter.attempt("a", "messages"));

        let cancel = Cancellation::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            limiter.wait_cancellable("a", "messages", 0, &cancel),
        )
        .await
        .expect("cancellation should interrupt the wait");
        assert!(matches!(result, Err(GatewayError::Cancelled)));
    }
}
