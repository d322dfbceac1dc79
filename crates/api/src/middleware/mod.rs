//! HTTP middleware stack for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (browser origins of the admin and staff frontend)
//!
//! Bearer authentication is an extractor rather than a layer: handlers that
//! need a user take [`RequireAuth`].

pub mod auth;
pub mod request_id;

pub use auth::{CurrentUser, RequireAuth};
pub use request_id::request_id_middleware;
