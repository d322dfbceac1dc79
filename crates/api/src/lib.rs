//! Storedesk API library.
//!
//! REST backend for a retail back office: stores, their managers and
//! representatives, per-store performance targets, bearer-token login and
//! the admin passcode gate.
//!
//! The binary in `main.rs` wires configuration, tracing and Sentry around
//! [`app`]; tests drive [`app`] directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::config::ApiConfig;
use crate::state::AppState;

/// CORS for the browser frontend: configured origins, JSON and bearer headers.
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(middleware::request_id::REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(
            middleware::request_id::REQUEST_ID_HEADER,
        )])
}

/// Build the application router with all middleware attached.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config());

    routes::routes()
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(cors)
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{Value, json};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;

    /// A router whose pool never connects; only routes that fail before
    /// touching the database can be exercised.
    fn test_app(admin_passcode: Option<&str>) -> Router {
        let config = ApiConfig::from_source(|key| match key {
            "STOREDESK_DATABASE_URL" => Some("postgres://localhost:1/storedesk_test".to_string()),
            "ADMIN_PASSCODE" => admin_passcode.map(str::to_string),
            _ => None,
        })
        .unwrap();
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost:1/storedesk_test")
            .unwrap();

        app(AppState::new(config, pool))
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        let body = body.map_or_else(Body::empty, |b| Body::from(b.to_string()));
        app.oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = send(test_app(None), "GET", "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_passcode_verified() {
        let response = send(
            test_app(Some("letmein")),
            "POST",
            "/api/admin/verify-passcode",
            Some(json!({ "passcode": "letmein" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "success": true, "message": "Passcode verified successfully." })
        );
    }

    #[tokio::test]
    async fn test_passcode_invalid() {
        let response = send(
            test_app(Some("letmein")),
            "POST",
            "/api/admin/verify-passcode",
            Some(json!({ "passcode": "nope" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({ "success": false, "message": "Invalid passcode." })
        );
    }

    #[tokio::test]
    async fn test_passcode_missing() {
        let response = send(
            test_app(Some("letmein")),
            "POST",
            "/api/admin/verify-passcode",
            Some(json!({ "passcode": 1234 })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await,
            json!({ "success": false, "message": "Passcode is required." })
        );
    }

    #[tokio::test]
    async fn test_passcode_not_configured_regardless_of_input() {
        for passcode in ["anything", "letmein"] {
            let response = send(
                test_app(None),
                "POST",
                "/api/admin/verify-passcode",
                Some(json!({ "passcode": passcode })),
            )
            .await;
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                body_json(response).await,
                json!({ "success": false, "message": "Admin passcode is not configured." })
            );
        }

        let response = send(
            test_app(Some("")),
            "POST",
            "/api/admin/verify-passcode",
            Some(json!({ "passcode": "anything" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_login_validation() {
        let response = send(
            test_app(None),
            "POST",
            "/api/login",
            Some(json!({ "email": "not-an-email" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await,
            json!({
                "message": "The email field must be a valid email address. (and 1 more error)",
                "errors": {
                    "email": ["The email field must be a valid email address."],
                    "password": ["The password field is required."],
                }
            })
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_unprocessable() {
        let app = test_app(None);
        let request = Request::builder()
            .method("POST")
            .uri("/api/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_json(response).await["message"].is_string());
    }

    #[tokio::test]
    async fn test_protected_routes_require_bearer() {
        for (method, uri) in [
            ("GET", "/api/me"),
            ("POST", "/api/logout"),
            ("GET", "/api/store-managers/my-store"),
            ("GET", "/api/store-representatives/my-store"),
        ] {
            let response = send(test_app(None), method, uri, None).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(
                body_json(response).await,
                json!({ "message": "Unauthenticated." })
            );
        }
    }

    #[tokio::test]
    async fn test_malformed_bearer_is_unauthenticated() {
        let app = test_app(None);
        let request = Request::builder()
            .uri("/api/me")
            .header(header::AUTHORIZATION, "Bearer not-a-token")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_numeric_ids_are_not_found() {
        let response = send(test_app(None), "GET", "/api/stores/abc", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Store not found" })
        );

        let response = send(test_app(None), "DELETE", "/api/store-managers/abc", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Store manager not found" })
        );
    }
}
