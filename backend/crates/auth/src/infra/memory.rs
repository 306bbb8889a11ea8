//! In-Memory Credential Store
//!
//! Process-local store for development and tests. Records are keyed by
//! canonical user name; check-and-insert happens under one write lock.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tokio::sync::RwLock;

use crate::domain::entity::user::User;
use crate::domain::repository::{CredentialStore, StoreError, StoreResult};
use crate::domain::value_object::{
    user_name::UserName, user_password::UserPassword, user_role::UserRole,
};

#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    async fn create(
        &self,
        user_name: &UserName,
        password_hash: &UserPassword,
        user_role: UserRole,
    ) -> StoreResult<User> {
        let mut users = self.users.write().await;
        match users.entry(user_name.canonical().to_string()) {
            Entry::Occupied(_) => Err(StoreError::Conflict),
            Entry::Vacant(slot) => {
                let user = User::new(user_name.clone(), password_hash.clone(), user_role);
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(user_name.canonical()).cloned())
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.users.read().await.len() as u64)
    }
}
