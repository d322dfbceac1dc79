//! Staff repository, covering both `store_managers` and `store_representatives`.
//!
//! The two tables have identical columns. A repository is bound to one
//! `StaffRole`, which picks the table; the table name is always one of two
//! static strings, never user input.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use storedesk_core::{Email, StaffId, StaffRole, StoreId, UserId};

use super::{RepositoryError, contains_pattern, parse_column};
use crate::models::{NewStaff, StaffChanges, StaffFilter, StaffMember};

const STAFF_COLUMNS: &str =
    "id, name, email, phone, store_id, user_id, status, created_at, updated_at";

/// Table backing a staff role.
const fn table(role: StaffRole) -> &'static str {
    match role {
        StaffRole::StoreManager => "store_managers",
        StaffRole::StoreRepresentative => "store_representatives",
    }
}

#[derive(sqlx::FromRow)]
struct StaffRow {
    id: StaffId,
    name: String,
    email: String,
    phone: String,
    store_id: StoreId,
    user_id: Option<UserId>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StaffRow {
    fn into_member(self, role: StaffRole) -> Result<StaffMember, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in {}: {e}", table(role)))
        })?;

        Ok(StaffMember {
            id: self.id,
            role,
            name: self.name,
            email,
            phone: self.phone,
            store_id: self.store_id,
            user_id: self.user_id,
            status: parse_column(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for one staff role's table.
pub struct StaffRepository<'a> {
    pool: &'a PgPool,
    role: StaffRole,
}

impl<'a> StaffRepository<'a> {
    /// Create a repository for the given role.
    #[must_use]
    pub const fn new(pool: &'a PgPool, role: StaffRole) -> Self {
        Self { pool, role }
    }

    /// List staff in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &StaffFilter) -> Result<Vec<StaffMember>, RepositoryError> {
        let pattern = contains_pattern(filter.search.as_deref());

        let rows = sqlx::query_as::<_, StaffRow>(&format!(
            r"
            SELECT {STAFF_COLUMNS}
            FROM {table}
            WHERE ($1::text IS NULL OR name LIKE $1 OR email LIKE $1 OR phone LIKE $1)
              AND ($2::bigint IS NULL OR store_id = $2)
            ORDER BY id
            ",
            table = table(self.role),
        ))
        .bind(pattern)
        .bind(filter.store_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.into_member(self.role))
            .collect()
    }

    /// Get a staff record by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: StaffId) -> Result<Option<StaffMember>, RepositoryError> {
        get_in(self.pool, self.role, id, false).await
    }

    /// Get the first staff record linked to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<StaffMember>, RepositoryError> {
        let row = sqlx::query_as::<_, StaffRow>(&format!(
            "SELECT {STAFF_COLUMNS} FROM {table} WHERE user_id = $1 ORDER BY id LIMIT 1",
            table = table(self.role),
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| r.into_member(self.role)).transpose()
    }

    /// Insert a staff record with no login credential.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_unlinked(&self, staff: &NewStaff) -> Result<StaffMember, RepositoryError> {
        insert_in(self.pool, self.role, staff, None).await
    }

    /// Count the staff assigned to a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_store(&self, store_id: StoreId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {table} WHERE store_id = $1",
            table = table(self.role),
        ))
        .bind(store_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Delete a staff record. The linked user, if any, is kept.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the record does not exist.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: StaffId) -> Result<(), RepositoryError> {
        let result = sqlx::query(&format!(
            "DELETE FROM {table} WHERE id = $1",
            table = table(self.role),
        ))
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

// =============================================================================
// Executor-generic operations
// =============================================================================

/// Fetch a staff record, optionally locking the row for the transaction.
pub(crate) async fn get_in<'e, E>(
    executor: E,
    role: StaffRole,
    id: StaffId,
    for_update: bool,
) -> Result<Option<StaffMember>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, StaffRow>(&format!(
        "SELECT {STAFF_COLUMNS} FROM {table} WHERE id = $1{lock}",
        table = table(role),
        lock = if for_update { " FOR UPDATE" } else { "" },
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    row.map(|r| r.into_member(role)).transpose()
}

/// Insert a staff record linked to `user_id`.
pub(crate) async fn insert_in<'e, E>(
    executor: E,
    role: StaffRole,
    staff: &NewStaff,
    user_id: Option<UserId>,
) -> Result<StaffMember, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, StaffRow>(&format!(
        r"
        INSERT INTO {table} (name, email, phone, store_id, user_id, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {STAFF_COLUMNS}
        ",
        table = table(role),
    ))
    .bind(&staff.name)
    .bind(staff.email.as_str())
    .bind(&staff.phone)
    .bind(staff.store_id)
    .bind(user_id)
    .bind(staff.status.as_str())
    .fetch_one(executor)
    .await?;

    row.into_member(role)
}

/// Apply a partial update. A `Some` `link_user` replaces the linked user.
pub(crate) async fn update_in<'e, E>(
    executor: E,
    role: StaffRole,
    id: StaffId,
    changes: &StaffChanges,
    link_user: Option<UserId>,
) -> Result<StaffMember, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, StaffRow>(&format!(
        r"
        UPDATE {table}
        SET name = COALESCE($2, name),
            email = COALESCE($3, email),
            phone = COALESCE($4, phone),
            store_id = COALESCE($5, store_id),
            status = COALESCE($6, status),
            user_id = COALESCE($7, user_id),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {STAFF_COLUMNS}
        ",
        table = table(role),
    ))
    .bind(id)
    .bind(changes.name.as_deref())
    .bind(changes.email.as_ref().map(Email::as_str))
    .bind(changes.phone.as_deref())
    .bind(changes.store_id)
    .bind(changes.status.map(|s| s.as_str()))
    .bind(link_user)
    .fetch_optional(executor)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    row.into_member(role)
}
