//! Login Throttle
//!
//! Counts login attempts per canonical user name on top of
//! `platform::rate_limit`. Every attempt takes a slot before the password is
//! checked; a successful login clears the bucket, so only failures add up.

use platform::rate_limit::{InMemoryRateLimitStore, RateLimitConfig, RateLimitError, RateLimitStore};

use crate::error::{AuthError, AuthResult};

#[derive(Debug)]
pub struct LoginThrottle {
    store: InMemoryRateLimitStore,
    config: RateLimitConfig,
}

impl LoginThrottle {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            store: InMemoryRateLimitStore::new(),
            config,
        }
    }

    /// Take one attempt from the budget, or fail with `TooManyAttempts`
    pub async fn acquire(&self, key: &str) -> AuthResult<()> {
        let result = self
            .store
            .try_acquire(key, &self.config)
            .await
            .map_err(backend_error)?;

        if !result.allowed {
            tracing::warn!(
                retry_after_secs = result.reset_after.as_secs(),
                "Login throttled"
            );
            return Err(AuthError::TooManyAttempts);
        }
        Ok(())
    }

    pub async fn reset(&self, key: &str) -> AuthResult<()> {
        self.store.reset(key).await.map_err(backend_error)
    }

    /// Drop elapsed windows
    pub async fn purge_expired(&self) -> usize {
        self.store.purge_expired(&self.config).await
    }
}

fn backend_error(err: RateLimitError) -> AuthError {
    AuthError::Internal(err.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_blocks_after_max_attempts() {
        let throttle = LoginThrottle::new(RateLimitConfig::new(2, 60));

        throttle.acquire("alice").await.unwrap();
        throttle.acquire("alice").await.unwrap();

        assert!(matches!(
            throttle.acquire("alice").await,
            Err(AuthError::TooManyAttempts)
        ));
        // Other keys unaffected
        throttle.acquire("bob").await.unwrap();
    }

    #[tokio::test]
    async fn test_reset_clears_attempts() {
        let throttle = LoginThrottle::new(RateLimitConfig::new(1, 60));
        throttle.acquire("alice").await.unwrap();
        assert!(throttle.acquire("alice").await.is_err());

        throttle.reset("alice").await.unwrap();
        throttle.acquire("alice").await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_acquire_respects_budget() {
        let throttle = Arc::new(LoginThrottle::new(RateLimitConfig::new(2, 60)));

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let throttle = throttle.clone();
                tokio::spawn(async move { throttle.acquire("alice").await })
            })
            .collect();

        let mut granted = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                granted += 1;
            }
        }
        assert_eq!(granted, 2);
    }
}
