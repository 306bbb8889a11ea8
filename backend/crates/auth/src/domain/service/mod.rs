//! Domain Services
//!
//! Stateless helpers shared by the use cases.

pub mod password_hasher;
pub mod token_issuer;

pub use password_hasher::PasswordHasher;
pub use token_issuer::{SigningKey, TokenError, TokenIssuer};
