//! Application error handling
//!
//! This module provides unified error handling for the API,
//! converting service errors to appropriate HTTP responses.

use crate::services::{AuthError, TrackingError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use peso_shared::DomainError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The account exists but must set a password before logging in
    #[error("No password set for {email}")]
    NoPassword { email: String },

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            ApiError::NoPassword { .. } => (
                StatusCode::CONFLICT,
                "NO_PASSWORD",
                "Account has no password yet; set one to continue".to_string(),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Database(err) => {
                error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field: None,
            },
        });

        (status, body).into_response()
    }
}

impl From<TrackingError> for ApiError {
    fn from(err: TrackingError) -> Self {
        match err {
            TrackingError::UserNotFound
            | TrackingError::WeightNotFound
            | TrackingError::NoCurrentWeight
            | TrackingError::NoActiveGoal
            | TrackingError::GoalNotFound => ApiError::NotFound(err.to_string()),
            TrackingError::Validation(_)
            | TrackingError::SameWeight
            | TrackingError::UnrealisticGoal => ApiError::Validation(err.to_string()),
            TrackingError::UserNotActive | TrackingError::WeightNotOwned => {
                ApiError::Forbidden(err.to_string())
            }
            TrackingError::MaxDailyRecordingsExceeded | TrackingError::ActiveGoalExists => {
                ApiError::Conflict(err.to_string())
            }
            TrackingError::Repository { .. } => ApiError::Internal(anyhow::Error::new(err)),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::SessionExpired => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::EmailAlreadyExists => ApiError::Conflict(err.to_string()),
            AuthError::UserNotFound => ApiError::NotFound(err.to_string()),
            AuthError::NoPassword(user) => ApiError::NoPassword {
                email: user.email().to_string(),
            },
            AuthError::InvalidEmail | AuthError::Validation(_) => {
                ApiError::Validation(err.to_string())
            }
            AuthError::PasswordHashing(_) | AuthError::Repository { .. } => {
                ApiError::Internal(anyhow::Error::new(err))
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::RepositoryError;
    use peso_shared::{User, UserId};

    #[test]
    fn test_validation_error_status() {
        let error = ApiError::Validation("Invalid input".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_tracking_errors_map_to_status() {
        let cases = [
            (TrackingError::NoActiveGoal, StatusCode::NOT_FOUND),
            (TrackingError::WeightNotOwned, StatusCode::FORBIDDEN),
            (TrackingError::ActiveGoalExists, StatusCode::CONFLICT),
            (TrackingError::MaxDailyRecordingsExceeded, StatusCode::CONFLICT),
            (TrackingError::UnrealisticGoal, StatusCode::BAD_REQUEST),
            (
                TrackingError::Validation(DomainError::WeightTooHigh),
                StatusCode::BAD_REQUEST,
            ),
            (
                TrackingError::Repository {
                    context: "save weight record",
                    source: RepositoryError::Corrupt("bad unit".to_string()),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_no_password_is_conflict() {
        let user = User::new(UserId::new("u1").unwrap(), "Ann", "ann@example.com").unwrap();
        let error = ApiError::from(AuthError::NoPassword(Box::new(user)));

        assert!(matches!(&error, ApiError::NoPassword { email } if email == "ann@example.com"));
        assert_eq!(error.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_expired_session_is_unauthorized() {
        let response = ApiError::from(AuthError::SessionExpired).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
