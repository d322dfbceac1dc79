//! Bearer token authentication extractor.
//!
//! Clients send `Authorization: Bearer {id}|{secret}` with the token issued
//! by `POST /api/login`.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::{AppError, set_sentry_user};
use crate::models::{AccessToken, User};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// The authenticated user and the token they presented.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token: AccessToken,
}

/// Extractor that requires a valid bearer token.
///
/// Rejects with 401 `{"message": "Unauthenticated."}` when the header is
/// missing or the token is malformed, unknown or revoked.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(current): RequireAuth) -> String {
///     format!("Hello, {}!", current.user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Pull the token out of an `Authorization: Bearer ...` header value.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AuthError::Unauthenticated)?;

        let (user, token) = AuthService::new(state.pool()).authenticate(raw).await?;

        set_sentry_user(&user.id, Some(user.email.as_str()));

        Ok(Self(CurrentUser { user, token }))
    }
}
