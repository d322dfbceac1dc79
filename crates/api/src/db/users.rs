//! User repository for database operations.
//!
//! The `*_in` functions take any executor so the staff service can run them
//! inside its transaction; `UserRepository` wraps them for pool access.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use storedesk_core::{Email, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::User;

const USER_COLUMNS: &str = "id, name, email, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserWithPasswordRow {
    #[sqlx(flatten)]
    user: UserRow,
    password: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user along with their password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithPasswordRow>(&format!(
            "SELECT {USER_COLUMNS}, password FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((User::try_from(r.user)?, r.password)))
            .transpose()
    }

    /// Whether `email` belongs to a user other than `except`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_taken(
        &self,
        email: &Email,
        except: Option<UserId>,
    ) -> Result<bool, RepositoryError> {
        let taken: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE email = $1 AND ($2::bigint IS NULL OR id <> $2)
            )
            ",
        )
        .bind(email.as_str())
        .bind(except)
        .fetch_one(self.pool)
        .await?;

        Ok(taken)
    }

    /// Create a user with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        insert_in(self.pool, name, email, password_hash).await
    }
}

// =============================================================================
// Executor-generic operations
// =============================================================================

/// Look up a user by email.
pub(crate) async fn find_by_email_in<'e, E>(
    executor: E,
    email: &Email,
) -> Result<Option<User>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email.as_str())
    .fetch_optional(executor)
    .await?;

    row.map(User::try_from).transpose()
}

/// Insert a user.
pub(crate) async fn insert_in<'e, E>(
    executor: E,
    name: &str,
    email: &Email,
    password_hash: &str,
) -> Result<User, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r"
        INSERT INTO users (name, email, password)
        VALUES ($1, $2, $3)
        RETURNING {USER_COLUMNS}
        "
    ))
    .bind(name)
    .bind(email.as_str())
    .bind(password_hash)
    .fetch_one(executor)
    .await
    .map_err(|e| map_unique_violation(e, "email"))?;

    User::try_from(row)
}

/// Update the supplied fields of a user.
pub(crate) async fn update_in<'e, E>(
    executor: E,
    id: UserId,
    name: Option<&str>,
    email: Option<&Email>,
    password_hash: Option<&str>,
) -> Result<User, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, UserRow>(&format!(
        r"
        UPDATE users
        SET name = COALESCE($2, name),
            email = COALESCE($3, email),
            password = COALESCE($4, password),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "
    ))
    .bind(id)
    .bind(name)
    .bind(email.map(Email::as_str))
    .bind(password_hash)
    .fetch_optional(executor)
    .await
    .map_err(|e| map_unique_violation(e, "email"))?
    .ok_or(RepositoryError::NotFound)?;

    User::try_from(row)
}
