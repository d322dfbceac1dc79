//! Store CRUD handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use storedesk_core::{ActivityStatus, StoreId};

use super::{message, parse_id};
use crate::db::{RepositoryError, StoreRepository};
use crate::error::{AppError, Result};
use crate::extract::AppJson;
use crate::models::{NewStore, Store, StoreChanges, StoreFilter};
use crate::state::AppState;
use crate::validation::{
    self, FieldErrors, activity_status, email_address, parse_email, parse_field, parse_required,
    required, trimmed, trimmed_patch,
};

pub(crate) const STORE_NOT_FOUND: &str = "Store not found";

/// Build the stores router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stores", get(index).post(create))
        .route("/stores/{id}", get(show).put(update).delete(destroy))
}

// =============================================================================
// Request / Response Shapes
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct StoreQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

impl StoreQuery {
    /// Unknown status values are ignored rather than rejected.
    fn into_filter(self) -> StoreFilter {
        StoreFilter {
            search: self.search,
            status: self.status.and_then(|s| s.parse::<ActivityStatus>().ok()),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStoreRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "The name field is required."),
        length(min = 2, message = "The name field must be at least 2 characters.")
    )]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(required(message = "The address field is required."))]
    pub address: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(required(message = "The phone field is required."))]
    pub phone: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "The email field is required."),
        custom(function = "email_address")
    )]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "The status field is required."),
        custom(function = "activity_status")
    )]
    pub status: Option<String>,
}

/// Partial update: each supplied field obeys its create rule, so `null`
/// or a blank string is rejected rather than ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStoreRequest {
    #[serde(default, deserialize_with = "trimmed_patch")]
    #[validate(length(min = 2, message = "The name field must be at least 2 characters."))]
    pub name: Option<Option<String>>,

    #[serde(default, deserialize_with = "trimmed_patch")]
    pub address: Option<Option<String>>,

    #[serde(default, deserialize_with = "trimmed_patch")]
    pub phone: Option<Option<String>>,

    #[serde(default, deserialize_with = "trimmed_patch")]
    #[validate(custom(function = "email_address"))]
    pub email: Option<Option<String>>,

    #[serde(default, deserialize_with = "trimmed_patch")]
    #[validate(custom(function = "activity_status"))]
    pub status: Option<Option<String>>,
}

impl UpdateStoreRequest {
    fn errors(&self) -> FieldErrors {
        let mut errors = validation::check(self);
        errors.reject_null("name", self.name.as_ref());
        errors.reject_null("address", self.address.as_ref());
        errors.reject_null("phone", self.phone.as_ref());
        errors.reject_null("email", self.email.as_ref());
        errors.reject_null("status", self.status.as_ref());
        errors
    }
}

#[derive(Debug, Serialize)]
pub struct StoreJson {
    pub id: StoreId,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub status: ActivityStatus,
}

impl From<Store> for StoreJson {
    fn from(store: Store) -> Self {
        Self {
            id: store.id,
            name: store.name,
            address: store.address,
            phone: store.phone,
            email: store.email.into_inner(),
            status: store.status,
        }
    }
}

fn store_id(raw: &str) -> Result<StoreId> {
    parse_id(raw, STORE_NOT_FOUND)
}

fn not_found(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::not_found(STORE_NOT_FOUND),
        other => other.into(),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// List stores, optionally searched and filtered by status.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<StoreQuery>,
) -> Result<Json<Vec<StoreJson>>> {
    let stores = StoreRepository::new(state.pool())
        .list(&query.into_filter())
        .await?;

    Ok(Json(stores.into_iter().map(StoreJson::from).collect()))
}

/// Create a store.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateStoreRequest>,
) -> Result<(StatusCode, Json<StoreJson>)> {
    validation::check(&request).into_result()?;

    let new = NewStore {
        name: required(request.name, "name")?,
        address: required(request.address, "address")?,
        phone: required(request.phone, "phone")?,
        email: parse_email(&required(request.email, "email")?)?,
        status: parse_required(request.status.as_deref(), "status")?,
    };

    let store = StoreRepository::new(state.pool()).create(&new).await?;

    tracing::info!(store_id = %store.id, "Store created");

    Ok((StatusCode::CREATED, Json(store.into())))
}

/// Show one store.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoreJson>> {
    let store = StoreRepository::new(state.pool())
        .get(store_id(&id)?)
        .await?
        .ok_or_else(|| AppError::not_found(STORE_NOT_FOUND))?;

    Ok(Json(store.into()))
}

/// Apply a partial update to a store.
#[instrument(skip(state, request))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(request): AppJson<UpdateStoreRequest>,
) -> Result<Json<StoreJson>> {
    let id = store_id(&id)?;
    let repo = StoreRepository::new(state.pool());

    if !repo.exists(id).await? {
        return Err(AppError::not_found(STORE_NOT_FOUND));
    }

    request.errors().into_result()?;

    let changes = StoreChanges {
        name: request.name.flatten(),
        address: request.address.flatten(),
        phone: request.phone.flatten(),
        email: request.email.flatten().as_deref().map(parse_email).transpose()?,
        status: parse_field(request.status.flatten().as_deref(), "status")?,
    };

    let store = repo.update(id, &changes).await.map_err(not_found)?;

    tracing::info!(store_id = %store.id, "Store updated");

    Ok(Json(store.into()))
}

/// Delete a store and its targets.
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = store_id(&id)?;

    StoreRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(not_found)?;

    tracing::info!(store_id = %id, "Store deleted");

    Ok(message("Store deleted successfully"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_status_filter_is_ignored() {
        let filter = StoreQuery {
            search: Some("Mall".to_string()),
            status: Some("archived".to_string()),
        }
        .into_filter();
        assert_eq!(filter.search.as_deref(), Some("Mall"));
        assert_eq!(filter.status, None);

        let filter = StoreQuery {
            search: None,
            status: Some("inactive".to_string()),
        }
        .into_filter();
        assert_eq!(filter.status, Some(ActivityStatus::Inactive));
    }

    #[test]
    fn test_create_rules() {
        let request: CreateStoreRequest = serde_json::from_value(serde_json::json!({
            "name": "A",
            "address": "",
            "email": "mall-at-store.com",
            "status": "closed",
        }))
        .unwrap();

        let errors = validation::check(&request);
        assert_eq!(
            errors.get("name").unwrap(),
            ["The name field must be at least 2 characters."]
        );
        assert_eq!(errors.get("address").unwrap(), ["The address field is required."]);
        assert_eq!(errors.get("phone").unwrap(), ["The phone field is required."]);
        assert_eq!(
            errors.get("email").unwrap(),
            ["The email field must be a valid email address."]
        );
        assert_eq!(errors.get("status").unwrap(), ["The selected status is invalid."]);
    }

    #[test]
    fn test_create_trims_strings() {
        let request: CreateStoreRequest = serde_json::from_value(serde_json::json!({
            "name": "   ",
            "address": " 456 Shopping Mall ",
            "phone": "+1-555-0102",
            "email": " mall@store.com ",
            "status": "active",
        }))
        .unwrap();

        let errors = validation::check(&request);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("name").unwrap(), ["The name field is required."]);
        assert_eq!(request.address.as_deref(), Some("456 Shopping Mall"));
        assert_eq!(request.email.as_deref(), Some("mall@store.com"));
    }

    #[test]
    fn test_update_allows_partial_body() {
        let request: UpdateStoreRequest =
            serde_json::from_value(serde_json::json!({ "status": "inactive" })).unwrap();
        assert!(request.errors().is_empty());
        assert_eq!(request.name, None);
    }

    #[test]
    fn test_update_rejects_explicit_null() {
        let request: UpdateStoreRequest = serde_json::from_value(serde_json::json!({
            "name": null,
            "email": null,
            "phone": "  ",
            "address": "Mall Road",
        }))
        .unwrap();

        let errors = request.errors();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("name").unwrap(), ["The name field is required."]);
        assert_eq!(errors.get("email").unwrap(), ["The email field is required."]);
        assert_eq!(errors.get("phone").unwrap(), ["The phone field is required."]);
        assert!(!errors.has("address"));
    }

    #[test]
    fn test_update_checks_supplied_values() {
        let request: UpdateStoreRequest = serde_json::from_value(serde_json::json!({
            "name": "A",
            "status": "closed",
        }))
        .unwrap();

        let errors = request.errors();
        assert_eq!(
            errors.get("name").unwrap(),
            ["The name field must be at least 2 characters."]
        );
        assert_eq!(errors.get("status").unwrap(), ["The selected status is invalid."]);
    }

    #[test]
    fn test_store_json_shape() {
        use chrono::Utc;
        use storedesk_core::Email;

        let store = Store {
            id: StoreId::new(2),
            name: "Mall Location".to_string(),
            address: "456 Shopping Mall, North District".to_string(),
            phone: "+1-555-0102".to_string(),
            email: Email::parse("mall@store.com").unwrap(),
            status: ActivityStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(
            serde_json::to_value(StoreJson::from(store)).unwrap(),
            serde_json::json!({
                "id": "2",
                "name": "Mall Location",
                "address": "456 Shopping Mall, North District",
                "phone": "+1-555-0102",
                "email": "mall@store.com",
                "status": "active",
            })
        );
    }
}
