//! Authentication service.
//!
//! Password login issuing personal access tokens, bearer token lookup,
//! logout, and role resolution from the staff tables.

mod error;
pub mod token;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use storedesk_core::{Email, StaffId, StaffRole, UserId};

use crate::db::{StaffRepository, TokenRepository, UserRepository};
use crate::models::{AccessToken, User};
use token::BearerToken;

/// Name recorded on tokens issued by password login.
const LOGIN_TOKEN_NAME: &str = "api-token";

/// Checked when the email is unknown so a miss costs one Argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("storedesk-unknown-user").ok());

/// The staff record a user is linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleAssignment {
    pub role: StaffRole,
    pub staff_id: StaffId,
}

/// A user together with their derived role.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    /// `None` for users in neither staff table (admins, unassigned).
    pub role: Option<RoleAssignment>,
}

/// Authentication service.
pub struct AuthService<'a> {
    pool: &'a PgPool,
    users: UserRepository<'a>,
    tokens: TokenRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            users: UserRepository::new(pool),
            tokens: TokenRepository::new(pool),
        }
    }

    // =========================================================================
    // Password Login
    // =========================================================================

    /// Login with email and password, issuing a new bearer token.
    ///
    /// Returns the user with their resolved role and the plaintext token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the
    /// password is wrong.
    pub async fn login(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<(AuthenticatedUser, String), AuthError> {
        let Some((user, password_hash)) = self.users.get_password_hash(email).await? else {
            verify_unknown_user(password);
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;

        let role = self.resolve_role(user.id).await?;
        let token = self.issue_token(user.id).await?;

        tracing::info!(user_id = %user.id, role = ?role.map(|r| r.role), "User logged in");

        Ok((AuthenticatedUser { user, role }, token))
    }

    /// Mint a token for a user and return its plaintext form.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the token cannot be stored.
    pub async fn issue_token(&self, user_id: UserId) -> Result<String, AuthError> {
        let secret = token::generate_secret();
        let stored = self
            .tokens
            .create(user_id, LOGIN_TOKEN_NAME, &token::hash_secret(&secret))
            .await?;

        Ok(BearerToken {
            id: stored.id,
            secret,
        }
        .to_plain_text())
    }

    // =========================================================================
    // Bearer Tokens
    // =========================================================================

    /// Resolve a presented bearer token to its user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthenticated` if the token is malformed,
    /// unknown, revoked, or belongs to a deleted user.
    pub async fn authenticate(&self, raw_token: &str) -> Result<(User, AccessToken), AuthError> {
        let presented: BearerToken = raw_token
            .parse()
            .map_err(|_| AuthError::Unauthenticated)?;

        let access = self
            .tokens
            .find_and_touch(presented.id, &token::hash_secret(&presented.secret))
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        let user = self
            .users
            .get_by_id(access.user_id)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        Ok((user, access))
    }

    /// Revoke the token used for the current request. Other tokens of the
    /// same user stay valid.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the delete fails.
    pub async fn logout(&self, token: AccessToken) -> Result<(), AuthError> {
        self.tokens.delete(token.id).await?;
        tracing::info!(user_id = %token.user_id, token_id = %token.id, "Token revoked");
        Ok(())
    }

    // =========================================================================
    // Roles
    // =========================================================================

    /// Derive a user's role: manager table first, then representative table.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if a lookup fails.
    pub async fn resolve_role(
        &self,
        user_id: UserId,
    ) -> Result<Option<RoleAssignment>, AuthError> {
        for role in StaffRole::ALL {
            if let Some(staff) = StaffRepository::new(self.pool, *role)
                .get_by_user(user_id)
                .await?
            {
                return Ok(Some(RoleAssignment {
                    role: *role,
                    staff_id: staff.id,
                }));
            }
        }

        Ok(None)
    }

    /// Load a user with a freshly resolved role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if a lookup fails.
    pub async fn with_role(&self, user: User) -> Result<AuthenticatedUser, AuthError> {
        let role = self.resolve_role(user.id).await?;
        Ok(AuthenticatedUser { user, role })
    }
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Spend the same Argon2 work as a wrong password. The result is ignored.
fn verify_unknown_user(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_role_lookup_order() {
        assert_eq!(
            StaffRole::ALL,
            &[StaffRole::StoreManager, StaffRole::StoreRepresentative]
        );
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("password", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("password123").unwrap();
        let b = hash_password("password123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_user_hash_is_a_real_argon2_hash() {
        let hash = DUMMY_HASH.as_deref().unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(matches!(
            verify_password("password123", hash),
            Err(AuthError::InvalidCredentials)
        ));
        verify_unknown_user("password123");
    }
}
