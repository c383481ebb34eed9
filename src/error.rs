use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Domain errors surfaced to HTTP callers. Every request fails independently;
/// nothing here is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Username already registered")]
    DuplicateUsername,

    #[error("{0}")]
    Unauthenticated(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Profile already exists for this user")]
    ProfileExists,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::DuplicateUsername => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ProfileExists => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal detail stays in the logs, not in the body.
        let message = match &self {
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::DuplicateUsername.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::ProfileExists.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthenticated("no token").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::NotFound("profile").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            ApiError::DuplicateUsername.to_string(),
            "Username already registered"
        );
        assert_eq!(ApiError::NotFound("profile").to_string(), "profile not found");
    }
}
