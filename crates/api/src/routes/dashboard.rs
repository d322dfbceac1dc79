//! "My store" dashboard for store managers and representatives.

use axum::{Extension, Json, extract::State};
use chrono::SecondsFormat;
use serde::Serialize;
use tracing::instrument;

use storedesk_core::{ActivityStatus, StaffRole, StoreId};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::{StoreMetrics, StoreOverview, dashboard};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStoreJson {
    pub id: StoreId,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub status: ActivityStatus,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct MyStoreResponse {
    pub store: DashboardStoreJson,
    pub metrics: StoreMetrics,
}

impl From<StoreOverview> for MyStoreResponse {
    fn from(overview: StoreOverview) -> Self {
        let store = overview.store;
        Self {
            store: DashboardStoreJson {
                id: store.id,
                name: store.name,
                address: store.address,
                phone: store.phone,
                email: store.email.into_inner(),
                status: store.status,
                created_at: store.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            },
            metrics: overview.metrics,
        }
    }
}

/// The current user's store with headcounts and age.
#[instrument(skip_all, fields(role = %role, user_id = %current.user.id))]
pub async fn my_store(
    State(state): State<AppState>,
    Extension(role): Extension<StaffRole>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<MyStoreResponse>> {
    let overview = dashboard::my_store(state.pool(), role, current.user.id).await?;
    Ok(Json(overview.into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use storedesk_core::Email;

    use super::*;
    use crate::models::Store;

    #[test]
    fn test_my_store_shape() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let overview = StoreOverview {
            store: Store {
                id: StoreId::new(1),
                name: "Downtown Store".to_string(),
                address: "123 Main Street, City Center".to_string(),
                phone: "+1-555-0101".to_string(),
                email: Email::parse("downtown@store.com").unwrap(),
                status: ActivityStatus::Active,
                created_at: created,
                updated_at: created,
            },
            metrics: StoreMetrics {
                total_managers: 1,
                total_representatives: 2,
                store_age_days: 10,
            },
        };

        assert_eq!(
            serde_json::to_value(MyStoreResponse::from(overview)).unwrap(),
            serde_json::json!({
                "store": {
                    "id": "1",
                    "name": "Downtown Store",
                    "address": "123 Main Street, City Center",
                    "phone": "+1-555-0101",
                    "email": "downtown@store.com",
                    "status": "active",
                    "createdAt": "2024-03-01T00:00:00.000000Z",
                },
                "metrics": {
                    "totalManagers": 1,
                    "totalRepresentatives": 2,
                    "storeAgeDays": 10,
                }
            })
        );
    }
}
