//! Unified error handling with Sentry integration.
//!
//! All route handlers return `Result<T, AppError>`. Responses are JSON
//! `{"error": ...}` bodies; validation errors also name the offending field.
//! Server-class errors are captured to Sentry before responding, and their
//! details never reach the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::orders::OrderWriteError;
use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input failed validation; names the field at fault.
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Entity absent - or owned by someone else, which must look identical.
    #[error("not found")]
    NotFound,

    /// Operation violates a state invariant.
    #[error("{0}")]
    Conflict(String),

    /// Caller is not authenticated (or not allowed).
    #[error("unauthorized")]
    Unauthorized,

    /// Malformed request outside the validation taxonomy.
    #[error("{0}")]
    BadRequest(String),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(RepositoryError),

    /// Authentication operation failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(message) => Self::Conflict(message),
            other => Self::Database(other),
        }
    }
}

impl From<OrderWriteError> for AppError {
    fn from(e: OrderWriteError) -> Self {
        match e {
            OrderWriteError::Validation(v) => Self::Validation {
                field: v.field(),
                message: v.to_string(),
            },
            OrderWriteError::Repository(r) => Self::from(r),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::PasswordHash | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Whether this error should be captured to Sentry.
    fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Internal(_)
                | Self::Auth(AuthError::PasswordHash | AuthError::Repository(_))
        )
    }

    /// Client-facing message, with internal details scrubbed.
    fn public_message(&self) -> String {
        if self.is_server_error() {
            return "Internal server error".to_string();
        }
        match self {
            Self::NotFound => "Not found".to_string(),
            Self::Unauthorized => "Unauthorized".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = match &self {
            Self::Validation { field, .. } => json!({
                "error": self.public_message(),
                "field": field,
            }),
            _ => json!({ "error": self.public_message() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::order::OrderValidationError;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Conflict("nope".to_string()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::BadRequest("bad".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_ownership_failures_are_plain_not_found() {
        let err = AppError::from(RepositoryError::NotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.public_message(), "Not found");
    }

    #[test]
    fn test_repository_conflict_maps_to_conflict() {
        let err = AppError::from(RepositoryError::Conflict(
            "Only pending orders can be deleted".to_string(),
        ));
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.public_message(), "Only pending orders can be deleted");
    }

    #[test]
    fn test_validation_error_names_the_field() {
        let err = AppError::from(OrderWriteError::Validation(
            OrderValidationError::MissingAddressField("city"),
        ));
        let AppError::Validation { field, message } = &err else {
            panic!("expected validation error");
        };
        assert_eq!(*field, "city");
        assert_eq!(message, "shipping address field `city` is required");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_server_errors_are_scrubbed() {
        let err = AppError::Internal("connection refused to 10.0.0.5".to_string());
        assert_eq!(err.public_message(), "Internal server error");
    }
}
