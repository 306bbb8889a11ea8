//! HTTP Handlers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};

use crate::application::service::AuthService;
use crate::domain::entity::session_token::Claims;
use crate::domain::repository::CredentialStore;
use crate::error::AuthResult;
use crate::presentation::dto::{
    HealthResponse, LoginRequest, MeResponse, RegisterRequest, TokenResponse,
};

/// Shared state for auth handlers
pub struct AuthAppState<S>
where
    S: CredentialStore,
{
    pub service: AuthService<S>,
}

impl<S> Clone for AuthAppState<S>
where
    S: CredentialStore,
{
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /auth/register
pub async fn register<S>(
    State(state): State<AuthAppState<S>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AuthResult<Json<TokenResponse>>
where
    S: CredentialStore + Send + Sync + 'static,
{
    let Json(req) = payload?;
    let ctx = state.service.config().request_context();

    let issued = state
        .service
        .register(req.username, req.password, &ctx)
        .await?;

    Ok(Json(issued.into()))
}

// ============================================================================
// Login
// ============================================================================

/// POST /auth/login
pub async fn login<S>(
    State(state): State<AuthAppState<S>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AuthResult<Json<TokenResponse>>
where
    S: CredentialStore + Send + Sync + 'static,
{
    let Json(req) = payload?;
    let ctx = state.service.config().request_context();

    let issued = state
        .service
        .authenticate(req.username, req.password, &ctx)
        .await?;

    Ok(Json(issued.into()))
}

// ============================================================================
// Me (requires bearer token)
// ============================================================================

/// GET /auth/me
pub async fn me(Extension(claims): Extension<Claims>) -> Json<MeResponse> {
    Json(claims.into())
}

// ============================================================================
// Health
// ============================================================================

/// GET /health
pub async fn health<S>(State(state): State<AuthAppState<S>>) -> AuthResult<Json<HealthResponse>>
where
    S: CredentialStore + Send + Sync + 'static,
{
    let ctx = state.service.config().request_context();
    let users = state.service.user_count(&ctx).await?;

    Ok(Json(HealthResponse {
        status: "ok",
        users,
    }))
}
