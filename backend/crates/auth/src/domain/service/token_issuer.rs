//! Token Issuer
//!
//! Stateless session tokens signed with HMAC-SHA256.
//!
//! ## Format
//! `base64url(json(claims)) "." base64url(hmac_sha256(key, first_segment))`
//!
//! ## Validation order
//! 1. Split and decode the signature
//! 2. Verify the signature over the raw payload segment (constant time)
//! 3. Only then decode the payload and read `exp`
//!
//! No claim is parsed before the signature has been checked.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use platform::crypto::{from_base64url, hmac_sha256, to_base64url, verify_hmac_sha256};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::domain::entity::session_token::{Claims, IssuedToken};
use crate::domain::value_object::user_role::UserRole;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Malformed token or bad signature
    #[error("Token is invalid")]
    Invalid,

    /// Signature is valid but `exp` has passed
    #[error("Token has expired")]
    Expired,

    /// Claims could not be serialized
    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

/// Process-wide HMAC key (32 bytes), zeroized on drop
#[derive(Clone)]
pub struct SigningKey(Zeroizing<[u8; 32]>);

impl SigningKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Fresh random key (development / tests)
    pub fn generate() -> Self {
        Self::new(platform::crypto::random_key())
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SigningKey").field(&"[REDACTED]").finish()
    }
}

/// Issues and validates signed session tokens
///
/// The key is fixed for the lifetime of the issuer.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    key: SigningKey,
}

impl TokenIssuer {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Issue a token for `subject` that expires after `ttl`
    pub fn issue(
        &self,
        subject: &str,
        role: UserRole,
        ttl: Duration,
    ) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, role, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(
        &self,
        subject: &str,
        role: UserRole,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let iat = now.timestamp();
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat,
            exp: iat.saturating_add(ttl_secs),
        };

        let payload =
            serde_json::to_vec(&claims).map_err(|e| TokenError::Encoding(e.to_string()))?;
        let payload_b64 = to_base64url(&payload);
        let signature = hmac_sha256(self.key.as_bytes(), payload_b64.as_bytes());

        Ok(IssuedToken {
            token: format!("{}.{}", payload_b64, to_base64url(&signature)),
            expires_at: claims.expires_at(),
        })
    }

    /// Verify signature, then expiry
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate as if the current time were `now`
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let (payload_b64, signature_b64) = token.split_once('.').ok_or(TokenError::Invalid)?;

        let signature = from_base64url(signature_b64).map_err(|_| TokenError::Invalid)?;
        if !verify_hmac_sha256(self.key.as_bytes(), payload_b64.as_bytes(), &signature) {
            return Err(TokenError::Invalid);
        }

        // Signature verified: the payload is ours
        let payload = from_base64url(payload_b64).map_err(|_| TokenError::Invalid)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Invalid)?;

        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SigningKey::new([7u8; 32]))
    }

    #[test]
    fn test_issue_and_validate() {
        let issuer = issuer();
        let issued = issuer.issue("alice", UserRole::Admin, HOUR).unwrap();

        let claims = issuer.validate(&issued.token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.expires_at(), issued.expires_at);
    }

    #[test]
    fn test_tampered_signature_is_invalid() {
        let issuer = issuer();
        let token = issuer.issue("alice", UserRole::User, HOUR).unwrap().token;

        let (payload, signature) = token.split_once('.').unwrap();
        let mut sig_bytes = from_base64url(signature).unwrap();
        sig_bytes[0] ^= 0xFF;
        let tampered = format!("{payload}.{}", to_base64url(&sig_bytes));

        assert_eq!(issuer.validate(&tampered), Err(TokenError::Invalid));
    }

    #[test]
    fn test_forged_claims_are_invalid() {
        let issuer = issuer();
        let token = issuer.issue("alice", UserRole::User, HOUR).unwrap().token;
        let (_, signature) = token.split_once('.').unwrap();

        // Escalate role, reuse original signature
        let forged_claims = Claims {
            sub: "alice".to_string(),
            role: UserRole::Admin,
            iat: 0,
            exp: i64::MAX,
        };
        let forged_payload = to_base64url(&serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{forged_payload}.{signature}");

        assert_eq!(issuer.validate(&forged), Err(TokenError::Invalid));
    }

    #[test]
    fn test_other_key_is_invalid() {
        let token = issuer().issue("alice", UserRole::User, HOUR).unwrap().token;
        let other = TokenIssuer::new(SigningKey::new([8u8; 32]));
        assert_eq!(other.validate(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_expired_token() {
        let issuer = issuer();
        let two_hours_ago = Utc::now() - chrono::Duration::hours(2);
        let token = issuer
            .issue_at("alice", UserRole::User, HOUR, two_hours_ago)
            .unwrap()
            .token;

        assert_eq!(issuer.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_expired_token_with_bad_signature_is_invalid() {
        // Signature is checked before expiry
        let issuer = issuer();
        let two_hours_ago = Utc::now() - chrono::Duration::hours(2);
        let token = issuer
            .issue_at("alice", UserRole::User, HOUR, two_hours_ago)
            .unwrap()
            .token;
        let other = TokenIssuer::new(SigningKey::new([9u8; 32]));

        assert_eq!(other.validate(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_validate_at_boundary() {
        let issuer = issuer();
        let now = Utc::now();
        let token = issuer
            .issue_at("alice", UserRole::User, HOUR, now)
            .unwrap()
            .token;

        let just_before = now + chrono::Duration::seconds(3599);
        let at_expiry = now + chrono::Duration::seconds(3600);
        assert!(issuer.validate_at(&token, just_before).is_ok());
        assert_eq!(
            issuer.validate_at(&token, at_expiry),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_malformed_tokens() {
        let issuer = issuer();
        for token in ["", "no-dot", "a.b.c", "!!!.???", "."] {
            assert_eq!(issuer.validate(token), Err(TokenError::Invalid), "{token}");
        }
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let issuer = issuer();
        let issued = issuer
            .issue("alice", UserRole::User, Duration::from_secs(u64::MAX))
            .unwrap();
        assert!(issuer.validate(&issued.token).is_ok());
    }

    #[test]
    fn test_key_debug_redacted() {
        let debug = format!("{:?}", issuer());
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("7, 7"));
    }
}
