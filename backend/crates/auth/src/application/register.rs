//! Register Use Case
//!
//! Creates a new credential record and issues its first token.

use std::sync::Arc;

use kernel::context::RequestContext;

use crate::application::config::AuthConfig;
use crate::domain::entity::session_token::IssuedToken;
use crate::domain::repository::CredentialStore;
use crate::domain::service::{password_hasher::PasswordHasher, token_issuer::TokenIssuer};
use crate::domain::value_object::{
    user_name::UserName, user_password::RawPassword, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub user_name: String,
    pub password: String,
}

/// Register use case
pub struct RegisterUseCase<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    hasher: PasswordHasher,
    issuer: Arc<TokenIssuer>,
    config: Arc<AuthConfig>,
}

impl<S> RegisterUseCase<S>
where
    S: CredentialStore,
{
    pub fn new(
        store: Arc<S>,
        hasher: PasswordHasher,
        issuer: Arc<TokenIssuer>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            store,
            hasher,
            issuer,
            config,
        }
    }

    pub async fn execute(
        &self,
        input: RegisterInput,
        ctx: &RequestContext,
    ) -> AuthResult<IssuedToken> {
        // Validate input
        let user_name =
            UserName::new(&input.user_name).map_err(|e| AuthError::Validation(e.to_string()))?;
        let raw_password = RawPassword::new(input.password)?;

        // Hash before touching the store
        let password_hash = ctx.run(self.hasher.hash(raw_password)).await??;

        // Uniqueness is decided by the store; a lost race surfaces as Conflict
        let user = ctx
            .run(
                self.store
                    .create(&user_name, &password_hash, UserRole::default()),
            )
            .await??;

        let issued = self
            .issuer
            .issue(user.user_name.original(), user.user_role, self.config.token_ttl)?;

        tracing::info!(
            user_id = %user.user_id,
            user_name = %user.user_name,
            "User registered"
        );

        Ok(issued)
    }
}
