//! User Name Value Object
//!
//! The user name is the login handle and the subject of issued tokens.
//!
//! ## Processing order
//! NFKC normalization → trim → validation → lower-casing for the canonical form.
//!
//! ## Invariants
//! - Non-empty after normalization
//! - At most [`USER_NAME_MAX_LENGTH`] characters
//! - No whitespace and no control characters
//!
//! Uniqueness is decided on the canonical (lower-case) form, so `Alice` and
//! `alice` are the same account. The original spelling is kept for display.

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 64;

/// Error returned when user name validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    /// User name is empty after normalization
    Empty,

    /// User name is longer than USER_NAME_MAX_LENGTH
    TooLong { length: usize, max: usize },

    /// User name contains whitespace
    ContainsWhitespace,

    /// User name contains a control character
    InvalidCharacter { position: usize },
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "User name cannot be empty"),
            Self::TooLong { length, max } => {
                write!(f, "User name is too long ({length} chars, maximum {max})")
            }
            Self::ContainsWhitespace => write!(f, "User name cannot contain whitespace"),
            Self::InvalidCharacter { position } => {
                write!(f, "User name contains an invalid character at position {position}")
            }
        }
    }
}

impl std::error::Error for UserNameError {}

/// Validated, normalized user name
///
/// - `original`: trimmed, NFKC normalized input (preserves case)
/// - `canonical`: lower-case form used for uniqueness and lookup
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName {
    original: String,
    canonical: String,
}

impl UserName {
    /// Normalize and validate raw input
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let original = Self::normalize_original(input.as_ref());
        Self::validate(&original)?;
        let canonical = original.to_lowercase();
        Ok(Self {
            original,
            canonical,
        })
    }

    #[inline]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Rebuild from a stored original spelling (already validated on insert)
    pub fn from_db(original: &str) -> Self {
        Self {
            original: original.to_string(),
            canonical: original.to_lowercase(),
        }
    }

    /// Canonical form of arbitrary input, without validation
    ///
    /// Used as the key for per-user login throttling so that lookups on
    /// malformed names still share a bucket with their valid spelling.
    pub fn canonicalize(input: &str) -> String {
        Self::normalize_original(input).to_lowercase()
    }

    fn normalize_original(input: &str) -> String {
        input.nfkc().collect::<String>().trim().to_string()
    }

    fn validate(name: &str) -> Result<(), UserNameError> {
        if name.is_empty() {
            return Err(UserNameError::Empty);
        }

        let length = name.chars().count();
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        for (position, ch) in name.chars().enumerate() {
            if ch.is_whitespace() {
                return Err(UserNameError::ContainsWhitespace);
            }
            if ch.is_control() {
                return Err(UserNameError::InvalidCharacter { position });
            }
        }

        Ok(())
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserName")
            .field("original", &self.original)
            .field("canonical", &self.canonical)
            .finish()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for input in ["alice", "Bob_99", "carol.smith", "dave@example.com", "ユーザー"] {
            assert!(UserName::new(input).is_ok(), "{input} should be valid");
        }
    }

    #[test]
    fn test_trim_and_case() {
        let name = UserName::new("  Alice  ").unwrap();
        assert_eq!(name.original(), "Alice");
        assert_eq!(name.canonical(), "alice");
        assert_eq!(name.to_string(), "Alice");
    }

    #[test]
    fn test_nfkc_normalization() {
        // Fullwidth letters collapse to ASCII
        let name = UserName::new("ａｌｉｃｅ").unwrap();
        assert_eq!(name.canonical(), "alice");
        assert_eq!(UserName::canonicalize(" ＡＬＩＣＥ "), "alice");
    }

    #[test]
    fn test_empty() {
        assert_eq!(UserName::new(""), Err(UserNameError::Empty));
        assert_eq!(UserName::new("   "), Err(UserNameError::Empty));
    }

    #[test]
    fn test_too_long() {
        let long = "a".repeat(USER_NAME_MAX_LENGTH + 1);
        assert!(matches!(
            UserName::new(long),
            Err(UserNameError::TooLong { .. })
        ));
        assert!(UserName::new("a".repeat(USER_NAME_MAX_LENGTH)).is_ok());
    }

    #[test]
    fn test_inner_whitespace() {
        assert_eq!(
            UserName::new("john smith"),
            Err(UserNameError::ContainsWhitespace)
        );
    }

    #[test]
    fn test_control_character() {
        assert_eq!(
            UserName::new("ab\u{0000}c"),
            Err(UserNameError::InvalidCharacter { position: 2 })
        );
    }

    #[test]
    fn test_equal_canonical_forms() {
        let a = UserName::new("Alice").unwrap();
        let b = UserName::new("ALICE").unwrap();
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn test_serde_roundtrip_keeps_original() {
        let name = UserName::new("Alice").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"Alice\"");
        let back: UserName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
        assert!(serde_json::from_str::<UserName>("\"\"").is_err());
    }
}
