//! Session Token Entities
//!
//! Tokens are stateless: nothing here is persisted. A token is valid as long
//! as its signature checks out and `exp` lies in the future.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::user_role::UserRole;

/// Verified fields carried inside a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user name, original spelling)
    pub sub: String,
    pub role: UserRole,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiry (Unix seconds)
    pub exp: i64,
}

impl Claims {
    /// A token is expired from the second `exp` is reached
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Freshly issued token and its expiry
#[derive(Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[TOKEN]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
