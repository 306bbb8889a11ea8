//! Password Hashing and Verification
//!
//! - Argon2id hashing (memory-hard, recommended by OWASP)
//! - Random per-hash salt embedded in the PHC output
//! - Zeroization of clear text
//! - Constant-time verification (inside `argon2`)
//! - Optional pepper (application-wide secret)

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Maximum password length in Unicode code points
pub const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// Error Types
// ============================================================================

/// Password input rejected before hashing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password contains invalid control characters")]
    InvalidCharacter,
}

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// Not `Clone`, and `Debug` output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Normalize (NFKC) and validate a password from user input.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let raw = Zeroizing::new(raw);
        let normalized: String = raw.nfkc().collect();
        let normalized = Self(normalized);

        if normalized.0.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        let char_count = normalized.0.chars().count();
        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        // Space, tab and newline are allowed
        if normalized
            .0
            .chars()
            .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        Ok(normalized)
    }

    /// Create without validation (for internally generated passwords)
    pub fn new_unchecked(raw: String) -> Self {
        Self(raw)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    fn peppered(&self, pepper: Option<&[u8]>) -> Zeroizing<Vec<u8>> {
        let mut bytes = self.as_bytes().to_vec();
        if let Some(p) = pepper {
            bytes.extend_from_slice(p);
        }
        Zeroizing::new(bytes)
    }

    /// Hash the password using Argon2id with a fresh random salt
    pub fn hash(&self, pepper: Option<&[u8]>) -> Result<HashedPassword, PasswordHashError> {
        let password_bytes = self.peppered(pepper);

        // 128-bit random salt
        let salt = SaltString::generate(&mut OsRng);

        // OWASP parameters: m=19456 (19 MiB), t=2, p=1
        let hash = Argon2::default()
            .hash_password(&password_bytes, &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Argon2id hash in PHC string format
///
/// The PHC string carries algorithm, version, parameters, salt and hash.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Parse a PHC string (e.g., from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Verify a password against this hash.
    ///
    /// Returns `false` on mismatch and on an unparsable hash.
    pub fn verify(&self, password: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(&self.hash) else {
            return false;
        };

        let password_bytes = password.peppered(pepper);

        Argon2::default()
            .verify_password(&password_bytes, &parsed_hash)
            .is_ok()
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
