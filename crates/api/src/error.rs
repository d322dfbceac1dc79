//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Every error body is JSON with a `message` key; validation errors add an
//! `errors` map keyed by field.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::dashboard::DashboardError;
use crate::services::staff::{StaffError, role_label};
use crate::validation::FieldErrors;

/// Message returned for any 500.
const SERVER_ERROR_MESSAGE: &str = "Server Error";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// One or more request fields failed validation.
    #[error("Validation failed: {}", .0.summary())]
    Validation(FieldErrors),

    /// The request body could not be decoded.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// A 404 for a missing resource.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash)
        )
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::Unauthenticated => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Validation(_) | Self::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let body = match self {
            Self::Validation(errors) => json!({
                "message": errors.summary(),
                "errors": errors,
            }),
            Self::Auth(AuthError::InvalidCredentials) => {
                json!({ "message": "The provided credentials are incorrect." })
            }
            Self::Auth(AuthError::Unauthenticated) => json!({ "message": "Unauthenticated." }),
            Self::InvalidBody(message) | Self::NotFound(message) => json!({ "message": message }),
            Self::Database(_) | Self::Auth(_) => {
                json!({ "message": SERVER_ERROR_MESSAGE })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<StaffError> for AppError {
    fn from(err: StaffError) -> Self {
        match err {
            StaffError::NotFound(role) => {
                Self::NotFound(format!("{} not found", role_label(role)))
            }
            StaffError::EmailTaken => Self::Validation(FieldErrors::single(
                "email",
                "The email has already been taken.",
            )),
            StaffError::Auth(err) => Self::Auth(err),
            StaffError::Repository(err) => Self::Database(err),
        }
    }
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::NoStaffRecord(role) => {
                Self::NotFound(format!("{} record not found", role_label(role)))
            }
            DashboardError::StoreNotFound => Self::NotFound("Store not found".to_owned()),
            DashboardError::Repository(err) => Self::Database(err),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
