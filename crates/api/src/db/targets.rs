//! Store target repository.
//!
//! Every lookup is scoped to a store: a target ID under the wrong store is
//! treated as missing.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use storedesk_core::{StoreId, StoreTargetId};

use super::{RepositoryError, parse_column};
use crate::models::{NewTarget, StoreTarget, TargetChanges, TargetFilter};

const TARGET_COLUMNS: &str = "id, store_id, metric_type, period_type, target_value, \
     period_start, period_end, status, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct TargetRow {
    id: StoreTargetId,
    store_id: StoreId,
    metric_type: String,
    period_type: String,
    target_value: Decimal,
    period_start: NaiveDate,
    period_end: Option<NaiveDate>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TargetRow> for StoreTarget {
    type Error = RepositoryError;

    fn try_from(row: TargetRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            store_id: row.store_id,
            metric_type: parse_column(&row.metric_type)?,
            period_type: parse_column(&row.period_type)?,
            target_value: row.target_value,
            period_start: row.period_start,
            period_end: row.period_end,
            status: parse_column(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Treat empty filter strings as absent.
fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

/// Repository for store targets.
pub struct TargetRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TargetRepository<'a> {
    /// Create a new target repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a store's targets, newest period first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        store_id: StoreId,
        filter: &TargetFilter,
    ) -> Result<Vec<StoreTarget>, RepositoryError> {
        let rows = sqlx::query_as::<_, TargetRow>(&format!(
            r"
            SELECT {TARGET_COLUMNS}
            FROM store_targets
            WHERE store_id = $1
              AND ($2::text IS NULL OR period_type = $2)
              AND ($3::text IS NULL OR metric_type = $3)
              AND ($4::text IS NULL OR status = $4)
            ORDER BY period_start DESC, id
            "
        ))
        .bind(store_id)
        .bind(non_empty(filter.period_type.as_ref()))
        .bind(non_empty(filter.metric_type.as_ref()))
        .bind(non_empty(filter.status.as_ref()))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(StoreTarget::try_from).collect()
    }

    /// Get a target belonging to `store_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        store_id: StoreId,
        id: StoreTargetId,
    ) -> Result<Option<StoreTarget>, RepositoryError> {
        let row = sqlx::query_as::<_, TargetRow>(&format!(
            "SELECT {TARGET_COLUMNS} FROM store_targets WHERE store_id = $1 AND id = $2"
        ))
        .bind(store_id)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(StoreTarget::try_from).transpose()
    }

    /// Insert a target for a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        store_id: StoreId,
        target: &NewTarget,
    ) -> Result<StoreTarget, RepositoryError> {
        let row = sqlx::query_as::<_, TargetRow>(&format!(
            r"
            INSERT INTO store_targets
                (store_id, metric_type, period_type, target_value, period_start, period_end, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TARGET_COLUMNS}
            "
        ))
        .bind(store_id)
        .bind(target.metric_type.as_str())
        .bind(target.period_type.as_str())
        .bind(target.target_value)
        .bind(target.period_start)
        .bind(target.period_end)
        .bind(target.status.as_str())
        .fetch_one(self.pool)
        .await?;

        StoreTarget::try_from(row)
    }

    /// Apply a partial update to a target belonging to `store_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the target does not exist under the store.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        store_id: StoreId,
        id: StoreTargetId,
        changes: &TargetChanges,
    ) -> Result<StoreTarget, RepositoryError> {
        // $7 says whether period_end was supplied at all, since NULL is a
        // legitimate new value for it.
        let row = sqlx::query_as::<_, TargetRow>(&format!(
            r"
            UPDATE store_targets
            SET metric_type = COALESCE($3, metric_type),
                period_type = COALESCE($4, period_type),
                target_value = COALESCE($5, target_value),
                period_start = COALESCE($6, period_start),
                period_end = CASE WHEN $7 THEN $8 ELSE period_end END,
                status = COALESCE($9, status),
                updated_at = NOW()
            WHERE store_id = $1 AND id = $2
            RETURNING {TARGET_COLUMNS}
            "
        ))
        .bind(store_id)
        .bind(id)
        .bind(changes.metric_type.map(|m| m.as_str()))
        .bind(changes.period_type.map(|p| p.as_str()))
        .bind(changes.target_value)
        .bind(changes.period_start)
        .bind(changes.period_end.is_some())
        .bind(changes.period_end.flatten())
        .bind(changes.status.map(|s| s.as_str()))
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        StoreTarget::try_from(row)
    }

    /// Delete a target belonging to `store_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the target does not exist under the store.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(
        &self,
        store_id: StoreId,
        id: StoreTargetId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM store_targets WHERE store_id = $1 AND id = $2")
            .bind(store_id)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
