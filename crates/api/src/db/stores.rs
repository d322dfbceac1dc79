//! Store repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use storedesk_core::{Email, StoreId};

use super::{RepositoryError, contains_pattern, parse_column};
use crate::models::{NewStore, Store, StoreChanges, StoreFilter};

const STORE_COLUMNS: &str = "id, name, address, phone, email, status, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct StoreRow {
    id: StoreId,
    name: String,
    address: String,
    phone: String,
    email: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StoreRow> for Store {
    type Error = RepositoryError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            address: row.address,
            phone: row.phone,
            email,
            status: parse_column(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List stores in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &StoreFilter) -> Result<Vec<Store>, RepositoryError> {
        let pattern = contains_pattern(filter.search.as_deref());

        let rows = sqlx::query_as::<_, StoreRow>(&format!(
            r"
            SELECT {STORE_COLUMNS}
            FROM stores
            WHERE ($1::text IS NULL OR name LIKE $1 OR address LIKE $1 OR email LIKE $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY id
            "
        ))
        .bind(pattern)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Store::try_from).collect()
    }

    /// Get a store by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Store::try_from).transpose()
    }

    /// Whether a store with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: StoreId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM stores WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;

        Ok(exists)
    }

    /// Insert a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, store: &NewStore) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            r"
            INSERT INTO stores (name, address, phone, email, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {STORE_COLUMNS}
            "
        ))
        .bind(&store.name)
        .bind(&store.address)
        .bind(&store.phone)
        .bind(store.email.as_str())
        .bind(store.status.as_str())
        .fetch_one(self.pool)
        .await?;

        Store::try_from(row)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: StoreId,
        changes: &StoreChanges,
    ) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            r"
            UPDATE stores
            SET name = COALESCE($2, name),
                address = COALESCE($3, address),
                phone = COALESCE($4, phone),
                email = COALESCE($5, email),
                status = COALESCE($6, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {STORE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.address.as_deref())
        .bind(changes.phone.as_deref())
        .bind(changes.email.as_ref().map(Email::as_str))
        .bind(changes.status.map(|s| s.as_str()))
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Store::try_from(row)
    }

    /// Delete a store. Its targets go with it; its staff are left in place.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store does not exist.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: StoreId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
