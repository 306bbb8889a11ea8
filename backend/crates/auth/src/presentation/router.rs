//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::application::service::AuthService;
use crate::domain::repository::CredentialStore;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_bearer_token;

/// Create the auth router for any credential store
///
/// Routes: `POST /auth/register`, `POST /auth/login`, `GET /auth/me`
/// (bearer token required) and `GET /health`.
pub fn auth_router<S>(service: AuthService<S>) -> Router
where
    S: CredentialStore + Send + Sync + 'static,
{
    let state = AuthAppState { service };

    let protected = Router::new()
        .route("/auth/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer_token::<S>,
        ));

    Router::new()
        .route("/auth/register", post(handlers::register::<S>))
        .route("/auth/login", post(handlers::login::<S>))
        .route("/health", get(handlers::health::<S>))
        .merge(protected)
        .with_state(state)
}
