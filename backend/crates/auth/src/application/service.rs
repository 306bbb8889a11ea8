//! Authentication Service
//!
//! Entry point for the HTTP layer. Owns the store, hasher, token issuer and
//! login throttle; each operation builds its use case on demand.

use std::sync::Arc;

use kernel::context::RequestContext;

use crate::application::authenticate::{AuthenticateInput, AuthenticateUseCase};
use crate::application::config::AuthConfig;
use crate::application::register::{RegisterInput, RegisterUseCase};
use crate::application::throttle::LoginThrottle;
use crate::domain::entity::session_token::{Claims, IssuedToken};
use crate::domain::repository::CredentialStore;
use crate::domain::service::{password_hasher::PasswordHasher, token_issuer::TokenIssuer};
use crate::error::AuthResult;

pub struct AuthService<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    hasher: PasswordHasher,
    issuer: Arc<TokenIssuer>,
    throttle: Option<Arc<LoginThrottle>>,
    config: Arc<AuthConfig>,
}

impl<S> Clone for AuthService<S>
where
    S: CredentialStore,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            hasher: self.hasher.clone(),
            issuer: self.issuer.clone(),
            throttle: self.throttle.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S> AuthService<S>
where
    S: CredentialStore + Send + Sync + 'static,
{
    pub fn new(store: S, hasher: PasswordHasher, issuer: TokenIssuer, config: AuthConfig) -> Self {
        let throttle = config
            .login_throttle
            .clone()
            .map(|throttle| Arc::new(LoginThrottle::new(throttle)));

        Self {
            store: Arc::new(store),
            hasher,
            issuer: Arc::new(issuer),
            throttle,
            config: Arc::new(config),
        }
    }

    /// Wire hasher and issuer from `config`
    pub fn from_config(store: S, config: AuthConfig) -> Self {
        let hasher = PasswordHasher::new(config.pepper().map(<[u8]>::to_vec));
        let issuer = TokenIssuer::new(config.token_secret.clone());
        Self::new(store, hasher, issuer, config)
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub async fn register(
        &self,
        user_name: String,
        password: String,
        ctx: &RequestContext,
    ) -> AuthResult<IssuedToken> {
        let use_case = RegisterUseCase::new(
            self.store.clone(),
            self.hasher.clone(),
            self.issuer.clone(),
            self.config.clone(),
        );

        use_case
            .execute(
                RegisterInput {
                    user_name,
                    password,
                },
                ctx,
            )
            .await
    }

    pub async fn authenticate(
        &self,
        user_name: String,
        password: String,
        ctx: &RequestContext,
    ) -> AuthResult<IssuedToken> {
        let use_case = AuthenticateUseCase::new(
            self.store.clone(),
            self.hasher.clone(),
            self.issuer.clone(),
            self.throttle.clone(),
            self.config.clone(),
        );

        use_case
            .execute(
                AuthenticateInput {
                    user_name,
                    password,
                },
                ctx,
            )
            .await
    }

    /// Verify a bearer token and return its claims
    pub fn validate_token(&self, token: &str) -> AuthResult<Claims> {
        Ok(self.issuer.validate(token)?)
    }

    /// Number of stored users
    pub async fn user_count(&self, ctx: &RequestContext) -> AuthResult<u64> {
        Ok(ctx.run(self.store.count()).await??)
    }

    /// Do one-time expensive setup before serving requests
    pub async fn warm_up(&self) -> AuthResult<()> {
        self.hasher.warm_up().await
    }

    /// Drop elapsed throttle windows
    pub async fn purge_throttle(&self) -> usize {
        match &self.throttle {
            Some(throttle) => throttle.purge_expired().await,
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_password::RawPassword;
    use crate::infra::memory::InMemoryCredentialStore;

    fn raw(s: &str) -> RawPassword {
        RawPassword::new(s.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_from_config_applies_pepper() {
        let config = AuthConfig {
            password_pepper: Some(b"house-pepper".to_vec()),
            ..AuthConfig::development()
        };
        let service = AuthService::from_config(InMemoryCredentialStore::new(), config);

        let hash = service.hasher.hash(raw("correct horse")).await.unwrap();

        let same_pepper = PasswordHasher::new(Some(b"house-pepper".to_vec()));
        let no_pepper = PasswordHasher::new(None);
        assert!(same_pepper.verify(raw("correct horse"), hash.clone()).await.unwrap());
        assert!(!no_pepper.verify(raw("correct horse"), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_warm_up_succeeds() {
        let service = AuthService::from_config(InMemoryCredentialStore::new(), AuthConfig::development());
        service.warm_up().await.unwrap();
    }
}
