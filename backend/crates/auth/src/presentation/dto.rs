//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::domain::entity::session_token::{Claims, IssuedToken};
use crate::domain::value_object::user_role::UserRole;

// ============================================================================
// Register / Login
// ============================================================================

/// Register and login share one body shape
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

pub type RegisterRequest = CredentialsRequest;
pub type LoginRequest = CredentialsRequest;

/// Token response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    /// Always "Bearer"
    pub token_type: &'static str,
    /// Unix seconds
    pub expires_at: i64,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            token_type: "Bearer",
            expires_at: issued.expires_at.timestamp(),
        }
    }
}

// ============================================================================
// Me
// ============================================================================

/// Identity carried by the presented token
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub username: String,
    pub role: UserRole,
    pub expires_at: i64,
}

impl From<Claims> for MeResponse {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            role: claims.role,
            expires_at: claims.exp,
        }
    }
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    /// Registered users
    pub users: u64,
}
