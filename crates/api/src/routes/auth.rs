//! Login, logout and current-user handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use storedesk_core::{StaffId, StaffRole, UserId};

use super::message;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::extract::AppJson;
use crate::middleware::RequireAuth;
use crate::services::{AuthService, AuthenticatedUser};
use crate::state::AppState;
use crate::validation::{self, email_address, parse_email, required, trimmed};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "The email field is required."),
        custom(function = "email_address")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "The password field is required."),
        length(min = 1, message = "The password field is required.")
    )]
    pub password: Option<String>,
}

/// User as returned by login and `/me`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserJson {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Option<StaffRole>,
    pub role_id: Option<StaffId>,
}

impl From<AuthenticatedUser> for UserJson {
    fn from(auth: AuthenticatedUser) -> Self {
        Self {
            id: auth.user.id,
            name: auth.user.name,
            email: auth.user.email.into_inner(),
            role: auth.role.map(|r| r.role),
            role_id: auth.role.map(|r| r.staff_id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserJson,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserJson,
}

/// Exchange email and password for a bearer token.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    validation::check(&request).into_result()?;

    let email = parse_email(&required(request.email, "email")?)?;
    let password = required(request.password, "password")?;

    let (user, token) = AuthService::new(state.pool())
        .login(&email, &password)
        .await?;

    set_sentry_user(&user.user.id, Some(user.user.email.as_str()));

    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

/// Revoke the token used for this request.
#[instrument(skip_all, fields(user_id = %current.user.id))]
pub async fn logout(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<serde_json::Value>> {
    AuthService::new(state.pool()).logout(current.token).await?;
    clear_sentry_user();

    Ok(message("Logged out successfully"))
}

/// The authenticated user with a freshly resolved role.
#[instrument(skip_all, fields(user_id = %current.user.id))]
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<MeResponse>> {
    let user = AuthService::new(state.pool())
        .with_role(current.user)
        .await?;

    Ok(Json(MeResponse { user: user.into() }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use storedesk_core::Email;

    use super::*;
    use crate::models::User;
    use crate::services::RoleAssignment;

    fn user() -> User {
        User {
            id: UserId::new(7),
            name: "Robert Taylor".to_string(),
            email: Email::parse("robert.taylor@store.com").unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_json_with_role() {
        let json = UserJson::from(AuthenticatedUser {
            user: user(),
            role: Some(RoleAssignment {
                role: StaffRole::StoreManager,
                staff_id: StaffId::new(3),
            }),
        });

        assert_eq!(
            serde_json::to_value(json).unwrap(),
            serde_json::json!({
                "id": "7",
                "name": "Robert Taylor",
                "email": "robert.taylor@store.com",
                "role": "store_manager",
                "roleId": "3",
            })
        );
    }

    #[test]
    fn test_user_json_without_role() {
        let json = UserJson::from(AuthenticatedUser {
            user: user(),
            role: None,
        });

        let value = serde_json::to_value(json).unwrap();
        assert_eq!(value["role"], serde_json::Value::Null);
        assert_eq!(value["roleId"], serde_json::Value::Null);
    }

    #[test]
    fn test_login_request_rules() {
        let request: LoginRequest = serde_json::from_str("{}").unwrap();
        let errors = validation::check(&request);
        assert_eq!(errors.get("email").unwrap(), ["The email field is required."]);
        assert_eq!(
            errors.get("password").unwrap(),
            ["The password field is required."]
        );

        let request: LoginRequest =
            serde_json::from_str(r#"{"email": "nope", "password": "x"}"#).unwrap();
        let errors = validation::check(&request);
        assert_eq!(
            errors.get("email").unwrap(),
            ["The email field must be a valid email address."]
        );
        assert!(!errors.has("password"));

        let request: LoginRequest =
            serde_json::from_str(r#"{"email": " admin@store.com ", "password": "x"}"#).unwrap();
        assert!(validation::check(&request).is_empty());
        assert_eq!(request.email.as_deref(), Some("admin@store.com"));
    }
}
