//! User Password Value Objects
//!
//! Domain wrappers around `platform::password`.
//! - [`RawPassword`]: validated user input, zeroized on drop, never printed
//! - [`UserPassword`]: Argon2id PHC string, safe to store, never returned to clients

use platform::password::{
    ClearTextPassword, HashedPassword, PasswordHashError, PasswordPolicyError,
};
use std::fmt;

use crate::error::{AuthError, AuthResult};

// ============================================================================
// Raw Password (User Input)
// ============================================================================

pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Validate user input
    ///
    /// ## Errors
    /// `AuthError::Validation` with a user-facing message
    pub fn new(raw: String) -> AuthResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(|e| match e {
            PasswordPolicyError::EmptyOrWhitespace => {
                AuthError::Validation("Password cannot be empty".to_string())
            }
            other => AuthError::Validation(other.to_string()),
        })?;

        Ok(Self(clear_text))
    }

    /// Random password that no user can know
    pub(crate) fn random() -> Self {
        let bytes = platform::crypto::random_bytes(32);
        Self(ClearTextPassword::new_unchecked(
            platform::crypto::to_base64url(&bytes),
        ))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash a raw password (CPU-heavy; call from a blocking context)
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> AuthResult<Self> {
        let hashed = raw.inner().hash(pepper).map_err(|e| match e {
            PasswordHashError::HashingFailed(msg) => {
                AuthError::Internal(format!("Password hashing failed: {msg}"))
            }
            PasswordHashError::InvalidHashFormat => {
                AuthError::Internal("Unexpected error during password hashing".to_string())
            }
        })?;

        Ok(Self(hashed))
    }

    /// Parse a PHC string loaded from storage
    pub fn from_phc_string(phc_string: impl Into<String>) -> AuthResult<Self> {
        let hashed = HashedPassword::from_phc_string(phc_string)
            .map_err(|_| AuthError::Internal("Invalid password hash in store".to_string()))?;

        Ok(Self(hashed))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Constant-time verification; `false` on any mismatch
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

impl fmt::Display for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[HASHED_PASSWORD]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_password_validation() {
        assert!(RawPassword::new("hunter2".to_string()).is_ok());
        assert!(matches!(
            RawPassword::new("".to_string()),
            Err(AuthError::Validation(_))
        ));
        let too_long = "a".repeat(platform::password::MAX_PASSWORD_LENGTH + 1);
        assert!(matches!(
            RawPassword::new(too_long),
            Err(AuthError::Validation(_))
        ));
    }

    #[test]
    fn test_hash_and_verify() {
        let raw = RawPassword::new("TestPassword123!".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, None).unwrap();
        assert!(hashed.verify(&raw, None));

        let wrong = RawPassword::new("WrongPassword123!".to_string()).unwrap();
        assert!(!hashed.verify(&wrong, None));
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let raw = RawPassword::new("TestPassword123!".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, None).unwrap();

        let restored = UserPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(restored.verify(&raw, None));
        assert!(UserPassword::from_phc_string("plaintext").is_err());
    }

    #[test]
    fn test_random_password_differs() {
        let a = RawPassword::random();
        let hashed = UserPassword::from_raw(&a, None).unwrap();
        assert!(!hashed.verify(&RawPassword::random(), None));
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::new("SecretPassword123!".to_string()).unwrap();
        let debug = format!("{:?}", raw);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("Secret"));

        let hashed = UserPassword::from_raw(&raw, None).unwrap();
        assert!(format!("{:?}", hashed).contains("HASH"));
        assert_eq!(hashed.to_string(), "[HASHED_PASSWORD]");
    }
}
