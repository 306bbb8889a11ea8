//! Authenticate Use Case
//!
//! Verifies a user name / password pair and issues a token.
//!
//! ## Security
//! - Unknown user and wrong password both yield `InvalidCredentials`
//! - The unknown-user path still runs one Argon2 verification
//! - Attempts are counted per canonical user name when a throttle is set;
//!   a successful login clears the count

use std::sync::Arc;

use kernel::context::RequestContext;

use crate::application::config::AuthConfig;
use crate::application::throttle::LoginThrottle;
use crate::domain::entity::session_token::IssuedToken;
use crate::domain::repository::CredentialStore;
use crate::domain::service::{password_hasher::PasswordHasher, token_issuer::TokenIssuer};
use crate::domain::value_object::{user_name::UserName, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Authenticate input
pub struct AuthenticateInput {
    pub user_name: String,
    pub password: String,
}

/// Authenticate use case
pub struct AuthenticateUseCase<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    hasher: PasswordHasher,
    issuer: Arc<TokenIssuer>,
    throttle: Option<Arc<LoginThrottle>>,
    config: Arc<AuthConfig>,
}

impl<S> AuthenticateUseCase<S>
where
    S: CredentialStore,
{
    pub fn new(
        store: Arc<S>,
        hasher: PasswordHasher,
        issuer: Arc<TokenIssuer>,
        throttle: Option<Arc<LoginThrottle>>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            store,
            hasher,
            issuer,
            throttle,
            config,
        }
    }

    pub async fn execute(
        &self,
        input: AuthenticateInput,
        ctx: &RequestContext,
    ) -> AuthResult<IssuedToken> {
        if input.user_name.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation(
                "User name and password are required".to_string(),
            ));
        }

        // The slot is taken before any password work, so parallel guesses
        // cannot run ahead of the counter
        let throttle_key = UserName::canonicalize(&input.user_name);
        if let Some(throttle) = &self.throttle {
            throttle.acquire(&throttle_key).await?;
        }

        // Input that could never have been registered cannot match a record
        let (user_name, raw_password) = match (
            UserName::new(&input.user_name),
            RawPassword::new(input.password),
        ) {
            (Ok(user_name), Ok(raw_password)) => (user_name, raw_password),
            _ => return Err(AuthError::InvalidCredentials),
        };

        let user = ctx
            .run(self.store.find_by_user_name(&user_name))
            .await??;

        let Some(user) = user else {
            ctx.run(self.hasher.verify_dummy(raw_password)).await??;
            return Err(AuthError::InvalidCredentials);
        };

        let password_valid = ctx
            .run(self.hasher.verify(raw_password, user.password_hash.clone()))
            .await??;

        if !password_valid {
            return Err(AuthError::InvalidCredentials);
        }

        if let Some(throttle) = &self.throttle {
            throttle.reset(&throttle_key).await?;
        }

        let issued = self
            .issuer
            .issue(user.user_name.original(), user.user_role, self.config.token_ttl)?;

        tracing::info!(
            user_id = %user.user_id,
            user_name = %user.user_name,
            "User authenticated"
        );

        Ok(issued)
    }
}
