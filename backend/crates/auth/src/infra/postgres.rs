//! PostgreSQL Credential Store

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::user::User;
use crate::domain::repository::{CredentialStore, StoreError, StoreResult};
use crate::domain::value_object::{
    user_id::UserId, user_name::UserName, user_password::UserPassword, user_role::UserRole,
};

/// PostgreSQL-backed credential store
///
/// Uniqueness is enforced by the `UNIQUE` index on `user_name_canonical`.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CredentialStore for PgCredentialStore {
    async fn create(
        &self,
        user_name: &UserName,
        password_hash: &UserPassword,
        user_role: UserRole,
    ) -> StoreResult<User> {
        let user = User::new(user_name.clone(), password_hash.clone(), user_role);

        // Rolled back on drop if the request is cancelled before commit
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                user_name,
                user_name_canonical,
                password_hash,
                user_role,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.user_name.original())
        .bind(user.user_name.canonical())
        .bind(user.password_hash.as_phc_string())
        .bind(user.user_role.id())
        .bind(user.created_at)
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;

        Ok(user)
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                user_name,
                password_hash,
                user_role,
                created_at
            FROM users
            WHERE user_name_canonical = $1
            "#,
        )
        .bind(user_name.canonical())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn count(&self) -> StoreResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(count.max(0) as u64)
    }
}

/// Unique violations become `Conflict`; everything else is the backend failing
fn store_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict,
        _ => StoreError::Unavailable(err.to_string()),
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    user_name: String,
    password_hash: String,
    user_role: i16,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> StoreResult<User> {
        let password_hash = UserPassword::from_phc_string(self.password_hash)
            .map_err(|e| StoreError::Unavailable(format!("Corrupt password hash: {e}")))?;

        let user_role = UserRole::from_id(self.user_role).ok_or_else(|| {
            StoreError::Unavailable(format!("Unknown user_role id: {}", self.user_role))
        })?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            user_name: UserName::from_db(&self.user_name),
            password_hash,
            user_role,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_are_unavailable() {
        assert!(matches!(
            store_error(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            store_error(sqlx::Error::RowNotFound),
            StoreError::Unavailable(_)
        ));
    }

    #[test]
    fn test_row_with_unknown_role_is_rejected() {
        let row = UserRow {
            user_id: Uuid::new_v4(),
            user_name: "alice".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$0Sqxrp7s5DCz1yTe3PIu0D3JwxOJqTxHl9E1vjvJi2Q".to_string(),
            user_role: 42,
            created_at: Utc::now(),
        };
        assert!(matches!(row.into_user(), Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_row_into_user() {
        let id = Uuid::new_v4();
        let row = UserRow {
            user_id: id,
            user_name: "Alice".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$0Sqxrp7s5DCz1yTe3PIu0D3JwxOJqTxHl9E1vjvJi2Q".to_string(),
            user_role: 1,
            created_at: Utc::now(),
        };
        let user = row.into_user().unwrap();
        assert_eq!(user.user_id.as_uuid(), &id);
        assert_eq!(user.user_name.canonical(), "alice");
        assert_eq!(user.user_role, UserRole::Admin);
    }
}
