//! Database operations for the Storedesk `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Login credentials (role is derived, never stored)
//! - `personal_access_tokens` - Bearer tokens issued at login
//! - `stores` - Retail locations
//! - `store_managers` / `store_representatives` - Staff, one store each
//! - `store_targets` - Periodic performance goals per store
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p storedesk-cli -- migrate
//! ```
//!
//! Queries are built at runtime with `sqlx::query_as` and decoded into
//! private `*Row` structs, then converted into the public models.

pub mod staff;
pub mod stores;
pub mod targets;
pub mod tokens;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use staff::StaffRepository;
pub use stores::StoreRepository;
pub use targets::TargetRepository;
pub use tokens::TokenRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique violation to `Conflict`, anything else to `Database`.
pub(crate) fn map_unique_violation(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// Parse a text column into one of the core enums.
pub(crate) fn parse_column<T>(value: &str) -> Result<T, RepositoryError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| RepositoryError::DataCorruption(e.to_string()))
}

/// Build a `LIKE` pattern matching `term` anywhere, with wildcards escaped.
///
/// Returns `None` for an absent or empty term so callers can bind it
/// straight into a `$n::text IS NULL OR ...` filter.
#[must_use]
pub fn contains_pattern(term: Option<&str>) -> Option<String> {
    let term = term.filter(|t| !t.is_empty())?;

    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_wraps_term() {
        assert_eq!(contains_pattern(Some("Main")).as_deref(), Some("%Main%"));
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(
            contains_pattern(Some("50%_off\\")).as_deref(),
            Some("%50\\%\\_off\\\\%")
        );
    }

    #[test]
    fn test_contains_pattern_empty_is_absent() {
        assert_eq!(contains_pattern(Some("")), None);
        assert_eq!(contains_pattern(None), None);
    }

    #[test]
    fn test_parse_column_reports_corruption() {
        let err = parse_column::<storedesk_core::ActivityStatus>("archived").unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }
}
