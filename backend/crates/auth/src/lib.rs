//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, store trait, hasher and token issuer
//! - `application/` - Use cases and the `AuthService` facade
//! - `infra/` - In-memory and PostgreSQL credential stores
//! - `presentation/` - HTTP handlers, DTOs, router, bearer middleware
//!
//! ## Features
//! - Registration and login with user name + password
//! - Stateless HMAC-SHA256 bearer tokens carrying subject, role and expiry
//! - Per-user throttling of failed logins
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (salted, optional pepper)
//! - Token signatures checked in constant time before any claim is read
//! - Unknown user and wrong password are indistinguishable to callers

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::{config::AuthConfig, service::AuthService};
pub use domain::service::token_issuer::SigningKey;
pub use error::{AuthError, AuthResult};
pub use infra::{memory::InMemoryCredentialStore, postgres::PgCredentialStore};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
