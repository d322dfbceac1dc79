//! Personal access token repository.
//!
//! Only the sha256 hex digest of a token's secret is stored; the plaintext
//! is returned to the client once, at login.

use sqlx::PgPool;

use storedesk_core::{TokenId, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::AccessToken;

#[derive(sqlx::FromRow)]
struct TokenRow {
    id: TokenId,
    user_id: UserId,
}

impl From<TokenRow> for AccessToken {
    fn from(row: TokenRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
        }
    }
}

/// Repository for personal access tokens.
pub struct TokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a token digest for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a digest collision.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        name: &str,
        token_hash: &str,
    ) -> Result<AccessToken, RepositoryError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r"
            INSERT INTO personal_access_tokens (user_id, name, token_hash)
            VALUES ($1, $2, $3)
            RETURNING id, user_id
            ",
        )
        .bind(user_id)
        .bind(name)
        .bind(token_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "token"))?;

        Ok(row.into())
    }

    /// Find a token by ID and digest, recording it as used.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_and_touch(
        &self,
        id: TokenId,
        token_hash: &str,
    ) -> Result<Option<AccessToken>, RepositoryError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r"
            UPDATE personal_access_tokens
            SET last_used_at = NOW()
            WHERE id = $1 AND token_hash = $2
            RETURNING id, user_id
            ",
        )
        .bind(id)
        .bind(token_hash)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(AccessToken::from))
    }

    /// Revoke a single token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: TokenId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM personal_access_tokens WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
