//! Error conversions - transport mappings for [`AppError`].

#[cfg(feature = "axum")]
use super::app_error::AppError;

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

/// RFC 7807 Problem Details body for an [`AppError`]
#[cfg(feature = "axum")]
pub(crate) fn problem_details(err: &AppError) -> serde_json::Value {
    serde_json::json!({
        "type": format!("https://httpstatuses.io/{}", err.status_code()),
        "title": err.kind().as_str(),
        "status": err.status_code(),
        "detail": err.public_detail(),
        "action": err.action(),
    })
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(problem_details(&self))).into_response()
    }
}

#[cfg(all(test, feature = "axum"))]
mod tests {
    use super::*;
    use crate::error::kind::ErrorKind;

    #[test]
    fn test_problem_details_client_error() {
        let err = AppError::new(ErrorKind::Conflict, "User name already exists")
            .with_action("Please choose a different user name");
        let body = problem_details(&err);
        assert_eq!(body["status"], 409);
        assert_eq!(body["title"], "Conflict");
        assert_eq!(body["detail"], "User name already exists");
        assert_eq!(body["action"], "Please choose a different user name");
    }

    #[test]
    fn test_problem_details_hides_server_detail() {
        let err = AppError::internal("pool timed out after 5s on db-primary");
        let body = problem_details(&err);
        assert_eq!(body["status"], 500);
        assert!(!body["detail"].as_str().unwrap().contains("db-primary"));
    }

    #[test]
    fn test_into_response_status() {
        use axum::response::IntoResponse;
        let response = AppError::too_many_requests("Slow down").into_response();
        assert_eq!(response.status().as_u16(), 429);
    }
}
