//! Credential Store Trait
//!
//! The only persistence interface the service depends on. Implementations
//! live in the infrastructure layer.

use thiserror::Error;

use crate::domain::entity::user::User;
use crate::domain::value_object::{
    user_name::UserName, user_password::UserPassword, user_role::UserRole,
};

/// Storage-level failure
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with the same canonical user name already exists
    #[error("User name already exists")]
    Conflict,

    /// The storage backend could not serve the request
    #[error("Credential store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Credential store
///
/// `create` must enforce user name uniqueness atomically: when several
/// callers race on the same canonical name, exactly one succeeds and the
/// rest get [`StoreError::Conflict`].
#[trait_variant::make(CredentialStore: Send)]
pub trait LocalCredentialStore {
    /// Persist a new user record
    async fn create(
        &self,
        user_name: &UserName,
        password_hash: &UserPassword,
        user_role: UserRole,
    ) -> StoreResult<User>;

    /// Find a user by canonical user name
    async fn find_by_user_name(&self, user_name: &UserName) -> StoreResult<Option<User>>;

    /// Number of stored users
    async fn count(&self) -> StoreResult<u64>;
}
