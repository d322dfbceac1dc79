//! Staff service: store managers and store representatives with their
//! login credentials.
//!
//! Creating or re-linking a staff member touches two tables. Both writes
//! happen in one transaction so a failure never leaves a credential without
//! its staff record.

use sqlx::PgPool;
use thiserror::Error;

use storedesk_core::{StaffId, StaffRole};

use super::auth::{AuthError, hash_password};
use crate::db::{RepositoryError, staff, users};
use crate::models::{NewStaff, StaffChanges, StaffMember};

/// Errors from staff writes.
#[derive(Debug, Error)]
pub enum StaffError {
    /// No staff record with that ID.
    #[error("staff member not found")]
    NotFound(StaffRole),

    /// The email already belongs to another credential.
    #[error("email already taken")]
    EmailTaken,

    /// Password hashing failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for StaffError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => Self::EmailTaken,
            other => Self::Repository(other),
        }
    }
}

impl From<sqlx::Error> for StaffError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Display label for a role, as used in response messages.
#[must_use]
pub const fn role_label(role: StaffRole) -> &'static str {
    match role {
        StaffRole::StoreManager => "Store manager",
        StaffRole::StoreRepresentative => "Store representative",
    }
}

/// Transactional staff writes for one role.
pub struct StaffService<'a> {
    pool: &'a PgPool,
    role: StaffRole,
}

impl<'a> StaffService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, role: StaffRole) -> Self {
        Self { pool, role }
    }

    /// Create a credential user and the staff record linked to it.
    ///
    /// # Errors
    ///
    /// Returns `StaffError::EmailTaken` if a user with the email appeared
    /// since validation. Returns `StaffError::Repository` on database errors.
    pub async fn create(&self, new: &NewStaff, password: &str) -> Result<StaffMember, StaffError> {
        let password_hash = hash_password(password)?;

        let mut tx = self.pool.begin().await?;

        let user = users::insert_in(&mut *tx, &new.name, &new.email, &password_hash).await?;
        let member = staff::insert_in(&mut *tx, self.role, new, Some(user.id)).await?;

        tx.commit().await?;

        tracing::info!(
            role = %self.role,
            staff_id = %member.id,
            user_id = %user.id,
            "Staff member created"
        );

        Ok(member)
    }

    /// Apply a partial update, keeping the linked credential in step.
    ///
    /// When an email or password is supplied:
    /// - a linked user gets the supplied name, email and password;
    /// - with no linked user, a supplied password finds or creates a user by
    ///   the effective email and links it. An email alone creates nothing.
    ///
    /// # Errors
    ///
    /// Returns `StaffError::NotFound` if the record does not exist.
    /// Returns `StaffError::EmailTaken` if the new email belongs to another user.
    /// Returns `StaffError::Repository` on database errors.
    pub async fn update(
        &self,
        id: StaffId,
        changes: &StaffChanges,
        password: Option<&str>,
    ) -> Result<StaffMember, StaffError> {
        let password_hash = password.map(hash_password).transpose()?;

        let mut tx = self.pool.begin().await?;

        let current = staff::get_in(&mut *tx, self.role, id, true)
            .await?
            .ok_or(StaffError::NotFound(self.role))?;

        let mut link_user = None;

        if changes.email.is_some() || password_hash.is_some() {
            if let Some(user_id) = current.user_id {
                users::update_in(
                    &mut *tx,
                    user_id,
                    changes.name.as_deref(),
                    changes.email.as_ref(),
                    password_hash.as_deref(),
                )
                .await?;
            } else if let Some(hash) = password_hash.as_deref() {
                let email = changes.email.as_ref().unwrap_or(&current.email);
                let user = match users::find_by_email_in(&mut *tx, email).await? {
                    Some(existing) => existing,
                    None => {
                        let name = changes.name.as_deref().unwrap_or(&current.name);
                        users::insert_in(&mut *tx, name, email, hash).await?
                    }
                };
                link_user = Some(user.id);
            }
        }

        let member = staff::update_in(&mut *tx, self.role, id, changes, link_user).await?;

        tx.commit().await?;

        tracing::info!(role = %self.role, staff_id = %member.id, "Staff member updated");

        Ok(member)
    }
}
