//! User Entity
//!
//! The stored credential record. Created on registration and never mutated
//! by this service.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    user_id::UserId, user_name::UserName, user_password::UserPassword, user_role::UserRole,
};

/// User record
///
/// `Debug` is safe to log: the password hash prints as a placeholder.
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// User name (unique by canonical form)
    pub user_name: UserName,
    /// Argon2id hash of the password
    pub password_hash: UserPassword,
    pub user_role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new record with a fresh ID
    pub fn new(user_name: UserName, password_hash: UserPassword, user_role: UserRole) -> Self {
        Self {
            user_id: UserId::new(),
            user_name,
            password_hash,
            user_role,
            created_at: Utc::now(),
        }
    }
}
