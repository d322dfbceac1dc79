//! HTTP route handlers for the Storedesk API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                  - Liveness check
//! GET  /health/ready                            - Readiness check (database ping)
//!
//! # Auth (bearer tokens)
//! POST /api/login                               - Email + password, issues a token
//! POST /api/logout                              - Revoke the presented token
//! GET  /api/me                                  - Current user with derived role
//!
//! # Admin gate
//! POST /api/admin/verify-passcode               - Check the shared admin passcode
//!
//! # Stores
//! GET  /api/stores                              - List (?search=&status=)
//! POST /api/stores                              - Create
//! GET  /api/stores/{id}                         - Show
//! PUT  /api/stores/{id}                         - Partial update
//! DELETE /api/stores/{id}                       - Delete (cascades targets)
//!
//! # Store targets
//! GET  /api/stores/{store}/targets              - List (?period_type=&metric_type=&status=)
//! POST /api/stores/{store}/targets              - Create
//! GET  /api/stores/{store}/targets/{target}     - Show
//! PUT  /api/stores/{store}/targets/{target}     - Partial update
//! DELETE /api/stores/{store}/targets/{target}   - Delete
//!
//! # Staff (same routes under /api/store-representatives)
//! GET  /api/store-managers                      - List (?search=&storeId=)
//! POST /api/store-managers                      - Create with credential
//! GET  /api/store-managers/my-store             - Dashboard for the current user
//! GET  /api/store-managers/{id}                 - Show
//! PUT  /api/store-managers/{id}                 - Partial update
//! DELETE /api/store-managers/{id}               - Delete (credential kept)
//! ```

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod staff;
pub mod stores;
pub mod targets;

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde_json::json;

use storedesk_core::StaffRole;

use crate::error::AppError;
use crate::state::AppState;

/// Build the `/api` router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        // Admin gate
        .route("/admin/verify-passcode", post(admin::verify_passcode))
        // Stores and their targets
        .merge(stores::router())
        .merge(targets::router())
        // Staff
        .nest("/store-managers", staff::router(StaffRole::StoreManager))
        .nest(
            "/store-representatives",
            staff::router(StaffRole::StoreRepresentative),
        )
}

/// Build the complete router: health checks plus `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
}

/// Parse a path identifier. Anything that is not an integer is treated as
/// a missing resource.
pub(crate) fn parse_id<T: FromStr>(raw: &str, not_found: &str) -> Result<T, AppError> {
    raw.parse().map_err(|_| AppError::not_found(not_found))
}

/// Body for endpoints that only report an outcome.
pub(crate) fn message(text: &str) -> Json<serde_json::Value> {
    Json(json!({ "message": text }))
}

// =============================================================================
// Health
// =============================================================================

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
