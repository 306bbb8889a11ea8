//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::context::RequestInterrupted;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::repository::StoreError;
use crate::domain::service::token_issuer::TokenError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed request input
    #[error("{0}")]
    Validation(String),

    /// User name already exists
    #[error("User name already exists")]
    UsernameTaken,

    /// Unknown user or wrong password (deliberately indistinguishable)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token malformed or signature mismatch
    #[error("Token is invalid")]
    TokenInvalid,

    /// Token signature valid but expired
    #[error("Token has expired")]
    TokenExpired,

    /// Too many failed login attempts for this user name
    #[error("Too many failed login attempts")]
    TooManyAttempts,

    /// Credential store could not serve the request
    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),

    /// Request cancelled or timed out before completion
    #[error("Request was cancelled")]
    Cancelled,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::UsernameTaken => StatusCode::CONFLICT,
            AuthError::InvalidCredentials | AuthError::TokenInvalid | AuthError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            AuthError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::StoreUnavailable(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::UsernameTaken => ErrorKind::Conflict,
            AuthError::InvalidCredentials | AuthError::TokenInvalid | AuthError::TokenExpired => {
                ErrorKind::Unauthorized
            }
            AuthError::TooManyAttempts => ErrorKind::TooManyRequests,
            AuthError::Cancelled => ErrorKind::ServiceUnavailable,
            AuthError::StoreUnavailable(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            AuthError::UsernameTaken => err.with_action("Choose a different user name"),
            AuthError::TokenInvalid | AuthError::TokenExpired => {
                err.with_action("Sign in again to obtain a new token")
            }
            AuthError::TooManyAttempts => err.with_action("Wait a while before trying again"),
            AuthError::Cancelled => err.with_action("Retry the request"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::StoreUnavailable(msg) => {
                tracing::error!(message = %msg, "Credential store unavailable");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::TooManyAttempts => {
                tracing::warn!("Login attempt while throttled");
            }
            AuthError::Cancelled => {
                tracing::warn!("Auth request cancelled or timed out");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => AuthError::UsernameTaken,
            StoreError::Unavailable(msg) => AuthError::StoreUnavailable(msg),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => AuthError::TokenInvalid,
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Encoding(msg) => AuthError::Internal(msg),
        }
    }
}

impl From<RequestInterrupted> for AuthError {
    fn from(_: RequestInterrupted) -> Self {
        AuthError::Cancelled
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::UsernameTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::TokenExpired.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::TooManyAttempts.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AuthError::Cancelled.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_status_code_matches_kind() {
        let errors = [
            AuthError::Validation("x".into()),
            AuthError::UsernameTaken,
            AuthError::InvalidCredentials,
            AuthError::TokenInvalid,
            AuthError::TokenExpired,
            AuthError::TooManyAttempts,
            AuthError::StoreUnavailable("db".into()),
            AuthError::Cancelled,
            AuthError::Internal("boom".into()),
        ];
        for err in errors {
            assert_eq!(err.status_code().as_u16(), err.kind().status_code(), "{err}");
        }
    }

    #[test]
    fn test_store_error_mapping() {
        assert!(matches!(
            AuthError::from(StoreError::Conflict),
            AuthError::UsernameTaken
        ));
        assert!(matches!(
            AuthError::from(StoreError::Unavailable("down".into())),
            AuthError::StoreUnavailable(msg) if msg == "down"
        ));
    }

    #[test]
    fn test_token_error_mapping() {
        assert!(matches!(
            AuthError::from(TokenError::Invalid),
            AuthError::TokenInvalid
        ));
        assert!(matches!(
            AuthError::from(TokenError::Expired),
            AuthError::TokenExpired
        ));
    }

    #[test]
    fn test_interrupted_maps_to_cancelled() {
        assert!(matches!(
            AuthError::from(RequestInterrupted::TimedOut),
            AuthError::Cancelled
        ));
    }

    #[test]
    fn test_store_detail_hidden_from_clients() {
        let app = AuthError::StoreUnavailable("connection refused at 10.0.0.3".into()).to_app_error();
        assert!(!app.public_detail().contains("10.0.0.3"));
    }
}
