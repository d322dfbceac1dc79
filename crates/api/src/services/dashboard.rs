//! "My store" dashboard for authenticated staff.

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use storedesk_core::{StaffRole, UserId};

use crate::db::{RepositoryError, StaffRepository, StoreRepository};
use crate::models::Store;

/// Errors from dashboard lookups.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The user has no record in the requested role's table.
    #[error("no {0} record for user")]
    NoStaffRecord(StaffRole),

    /// The staff record points at a store that no longer exists.
    #[error("store not found")]
    StoreNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Headline numbers for a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreMetrics {
    pub total_managers: i64,
    pub total_representatives: i64,
    pub store_age_days: i64,
}

/// A store together with its metrics.
#[derive(Debug, Clone)]
pub struct StoreOverview {
    pub store: Store,
    pub metrics: StoreMetrics,
}

/// Build the dashboard for the user's store under the given role.
///
/// # Errors
///
/// Returns `DashboardError::NoStaffRecord` if the user is not staff in `role`.
/// Returns `DashboardError::StoreNotFound` if the staff record's store was deleted.
pub async fn my_store(
    pool: &PgPool,
    role: StaffRole,
    user_id: UserId,
) -> Result<StoreOverview, DashboardError> {
    let member = StaffRepository::new(pool, role)
        .get_by_user(user_id)
        .await?
        .ok_or(DashboardError::NoStaffRecord(role))?;

    let store = StoreRepository::new(pool)
        .get(member.store_id)
        .await?
        .ok_or(DashboardError::StoreNotFound)?;

    let total_managers = StaffRepository::new(pool, StaffRole::StoreManager)
        .count_for_store(store.id)
        .await?;
    let total_representatives = StaffRepository::new(pool, StaffRole::StoreRepresentative)
        .count_for_store(store.id)
        .await?;

    let metrics = StoreMetrics {
        total_managers,
        total_representatives,
        store_age_days: store.age_days(Utc::now()),
    };

    Ok(StoreOverview { store, metrics })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_serialize_camel_case() {
        let metrics = StoreMetrics {
            total_managers: 1,
            total_representatives: 2,
            store_age_days: 30,
        };

        assert_eq!(
            serde_json::to_value(metrics).unwrap(),
            serde_json::json!({
                "totalManagers": 1,
                "totalRepresentatives": 2,
                "storeAgeDays": 30,
            })
        );
    }
}
