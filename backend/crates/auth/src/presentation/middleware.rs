//! Auth Middleware
//!
//! Bearer token check for protected routes. Verified claims are stored in
//! request extensions for downstream handlers.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::repository::CredentialStore;
use crate::error::AuthError;
use crate::presentation::handlers::AuthAppState;

/// Middleware that requires a valid `Authorization: Bearer <token>` header
pub async fn require_bearer_token<S>(
    State(state): State<AuthAppState<S>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError>
where
    S: CredentialStore + Send + Sync + 'static,
{
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or(AuthError::TokenInvalid)?;

    let claims = state.service.validate_token(token)?;
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Extract the credential from a `Bearer` authorization value
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
