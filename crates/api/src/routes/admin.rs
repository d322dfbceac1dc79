//! Admin passcode gate.
//!
//! Responses always carry `success` and `message`, including failures, so
//! this handler builds its own bodies instead of going through `AppError`.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;

use crate::services::{PasscodeOutcome, passcode};
use crate::state::AppState;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PasscodeResponse {
    pub success: bool,
    pub message: &'static str,
}

impl PasscodeResponse {
    const fn failure(message: &'static str) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

/// Pull a non-empty string `passcode` out of the body.
fn passcode_field(body: &serde_json::Value) -> Option<&str> {
    body.get("passcode")
        .and_then(serde_json::Value::as_str)
        .filter(|p| !p.is_empty())
}

/// Check the submitted passcode against `ADMIN_PASSCODE`.
#[instrument(skip_all)]
pub async fn verify_passcode(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> (StatusCode, Json<PasscodeResponse>) {
    let body = body.map(|Json(value)| value).unwrap_or_default();

    let Some(provided) = passcode_field(&body) else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(PasscodeResponse::failure("Passcode is required.")),
        );
    };

    match passcode::verify(state.config().admin_passcode(), provided) {
        PasscodeOutcome::Verified => {
            tracing::info!("Admin passcode verified");
            (
                StatusCode::OK,
                Json(PasscodeResponse {
                    success: true,
                    message: "Passcode verified successfully.",
                }),
            )
        }
        PasscodeOutcome::Invalid => {
            tracing::warn!("Invalid admin passcode attempt");
            (
                StatusCode::UNAUTHORIZED,
                Json(PasscodeResponse::failure("Invalid passcode.")),
            )
        }
        PasscodeOutcome::NotConfigured => {
            tracing::error!("ADMIN_PASSCODE is not set");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(PasscodeResponse::failure(
                    "Admin passcode is not configured.",
                )),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_passcode_field() {
        assert_eq!(passcode_field(&json!({ "passcode": "1234" })), Some("1234"));
        assert_eq!(passcode_field(&json!({ "passcode": "" })), None);
        assert_eq!(passcode_field(&json!({ "passcode": 1234 })), None);
        assert_eq!(passcode_field(&json!({})), None);
        assert_eq!(passcode_field(&serde_json::Value::Null), None);
    }
}
