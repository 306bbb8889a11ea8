//! Rate Limiting Infrastructure
//!
//! Fixed-window counters keyed by an arbitrary string. Used for login
//! throttling: callers `try_acquire` a slot before doing expensive work and
//! `reset` when the subject proves itself. `try_acquire` checks and counts in
//! one step, so concurrent callers can never overspend the budget.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::Mutex;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum counted events allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    /// Time until the current window resets
    pub reset_after: Duration,
}

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Rate limit backend unavailable: {0}")]
    Backend(String),
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Current state of `key` without counting an event
    async fn check(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError>;

    /// Count one event for `key` and return the resulting state
    async fn increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError>;

    /// Count one event for `key` only if the budget allows it.
    ///
    /// A denied attempt is not counted.
    async fn try_acquire(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError>;

    /// Forget all events for `key`
    async fn reset(&self, key: &str) -> Result<(), RateLimitError>;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: Instant,
    count: u32,
}

impl Window {
    fn fresh(now: Instant) -> Self {
        Self {
            started_at: now,
            count: 0,
        }
    }

    fn is_expired(&self, now: Instant, config: &RateLimitConfig) -> bool {
        now.duration_since(self.started_at) >= config.window
    }

    fn result(&self, now: Instant, config: &RateLimitConfig) -> RateLimitResult {
        RateLimitResult {
            allowed: self.count < config.max_requests,
            remaining: config.max_requests.saturating_sub(self.count),
            reset_after: config
                .window
                .saturating_sub(now.duration_since(self.started_at)),
        }
    }
}

/// Process-local rate limit store
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    windows: Mutex<HashMap<String, Window>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop windows that have fully elapsed
    pub async fn purge_expired(&self, config: &RateLimitConfig) -> usize {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, w| !w.is_expired(now, config));
        before - windows.len()
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    async fn check(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError> {
        let now = Instant::now();
        let windows = self.windows.lock().await;
        let window = match windows.get(key) {
            Some(w) if !w.is_expired(now, config) => *w,
            _ => Window::fresh(now),
        };
        Ok(window.result(now, config))
    }

    async fn increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let window = windows
            .entry(key.to_string())
            .or_insert_with(|| Window::fresh(now));
        if window.is_expired(now, config) {
            *window = Window::fresh(now);
        }
        window.count = window.count.saturating_add(1);
        Ok(window.result(now, config))
    }

    async fn try_acquire(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let window = windows
            .entry(key.to_string())
            .or_insert_with(|| Window::fresh(now));
        if window.is_expired(now, config) {
            *window = Window::fresh(now);
        }
        if window.count >= config.max_requests {
            return Ok(window.result(now, config));
        }
        window.count += 1;
        Ok(RateLimitResult {
            allowed: true,
            ..window.result(now, config)
        })
    }

    async fn reset(&self, key: &str) -> Result<(), RateLimitError> {
        self.windows.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemoryRateLimitStore, RateLimitConfig, RateLimitStore};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fresh_key_is_allowed() {
        let store = InMemoryRateLimitStore::new();
        let config = RateLimitConfig::new(3, 60);
        let result = store.check("alice", &config).await.unwrap();
        assert!(result.allowed);
        assert_eq!(result.remaining, 3);
    }

    #[tokio::test]
    async fn test_blocks_after_max() {
        let store = InMemoryRateLimitStore::new();
        let config = RateLimitConfig::new(3, 60);

        for expected_remaining in [2, 1, 0] {
            let r = store.increment("alice", &config).await.unwrap();
            assert_eq!(r.remaining, expected_remaining);
        }

        let result = store.check("alice", &config).await.unwrap();
        assert!(!result.allowed);
        assert_eq!(result.remaining, 0);

        // Other keys are independent
        assert!(store.check("bob", &config).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_reset_clears_counter() {
        let store = InMemoryRateLimitStore::new();
        let config = RateLimitConfig::new(1, 60);
        store.increment("alice", &config).await.unwrap();
        assert!(!store.check("alice", &config).await.unwrap().allowed);

        store.reset("alice").await.unwrap();
        assert!(store.check("alice", &config).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_window_expires() {
        let store = InMemoryRateLimitStore::new();
        let config = RateLimitConfig {
            max_requests: 1,
            window: Duration::from_millis(20),
        };
        store.increment("alice", &config).await.unwrap();
        assert!(!store.check("alice", &config).await.unwrap().allowed);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(store.check("alice", &config).await.unwrap().allowed);
        assert_eq!(store.purge_expired(&config).await, 1);
    }

    #[tokio::test]
    async fn test_try_acquire_stops_at_budget() {
        let store = InMemoryRateLimitStore::new();
        let config = RateLimitConfig::new(2, 60);

        let first = store.try_acquire("alice", &config).await.unwrap();
        assert!(first.allowed);
        assert_eq!(first.remaining, 1);

        let second = store.try_acquire("alice", &config).await.unwrap();
        assert!(second.allowed);
        assert_eq!(second.remaining, 0);

        let third = store.try_acquire("alice", &config).await.unwrap();
        assert!(!third.allowed);

        // Denied attempts are not counted
        store.reset("alice").await.unwrap();
        assert!(store.try_acquire("alice", &config).await.unwrap().allowed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_try_acquire_concurrent_callers_share_budget() {
        let store = Arc::new(InMemoryRateLimitStore::new());
        let config = RateLimitConfig::new(3, 60);

        let tasks: Vec<_> = (0..32)
            .map(|_| {
                let store = store.clone();
                let config = config.clone();
                tokio::spawn(async move { store.try_acquire("alice", &config).await.unwrap() })
            })
            .collect();

        let mut granted = 0;
        for task in tasks {
            if task.await.unwrap().allowed {
                granted += 1;
            }
        }
        assert_eq!(granted, 3);
    }
}
