//! Domain Layer
//!
//! Contains entities, value objects, the credential store trait and the
//! stateless domain services (password hashing, token signing).

pub mod entity;
pub mod repository;
pub mod service;
pub mod value_object;

// Re-exports
pub use entity::{Claims, IssuedToken, User};
pub use repository::{CredentialStore, StoreError, StoreResult};
pub use service::{PasswordHasher, SigningKey, TokenError, TokenIssuer};
