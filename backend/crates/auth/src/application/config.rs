//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::fmt;
use std::time::Duration;

use kernel::context::RequestContext;
use platform::rate_limit::RateLimitConfig;

use crate::domain::service::token_issuer::SigningKey;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC key for session tokens (32 bytes)
    pub token_secret: SigningKey,
    /// Token lifetime (1 hour)
    pub token_ttl: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Upper bound for a single request's store work
    pub store_timeout: Duration,
    /// Failed-login throttle; `None` disables it
    pub login_throttle: Option<RateLimitConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: SigningKey::new([0u8; 32]),
            token_ttl: Duration::from_secs(3600), // 1 hour
            password_pepper: None,
            store_timeout: Duration::from_secs(5),
            login_throttle: Some(RateLimitConfig::new(5, 15 * 60)), // 5 failures / 15 min
        }
    }
}

impl AuthConfig {
    /// Create config with a random token secret (for development)
    pub fn with_random_secret() -> Self {
        Self {
            token_secret: SigningKey::generate(),
            ..Default::default()
        }
    }

    /// Create config for development (random secret, no throttle)
    pub fn development() -> Self {
        Self {
            login_throttle: None,
            ..Self::with_random_secret()
        }
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Fresh per-request context bounded by `store_timeout`
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_timeout(self.store_timeout)
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &self.token_secret)
            .field("token_ttl", &self.token_ttl)
            .field("peppered", &self.password_pepper.is_some())
            .field("store_timeout", &self.store_timeout)
            .field("login_throttle", &self.login_throttle)
            .finish()
    }
}
