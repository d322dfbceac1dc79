//! Store manager and store representative handlers.
//!
//! Both roles share one record shape and one set of handlers; the router for
//! each role carries its [`StaffRole`] as a request extension.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use storedesk_core::{ActivityStatus, Email, StaffId, StaffRole, StoreId, UserId};

use super::{dashboard, message, parse_id};
use crate::db::{RepositoryError, StaffRepository, StoreRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::extract::AppJson;
use crate::models::{NewStaff, StaffChanges, StaffFilter, StaffMember};
use crate::services::{StaffService, staff::role_label};
use crate::state::AppState;
use crate::validation::{
    self, FieldErrors, activity_status, double_option, email_address, parse_email, parse_field,
    parse_required, required, required_message, trimmed, trimmed_patch,
};

/// Build the router for one staff role.
pub fn router(role: StaffRole) -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/my-store", get(dashboard::my_store))
        .route("/{id}", get(show).put(update).delete(destroy))
        .layer(Extension(role))
}

// =============================================================================
// Request / Response Shapes
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct StaffQuery {
    pub search: Option<String>,
    #[serde(rename = "storeId")]
    pub store_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "The name field is required."),
        length(min = 2, message = "The name field must be at least 2 characters.")
    )]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "The email field is required."),
        custom(function = "email_address")
    )]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(required(message = "The phone field is required."))]
    pub phone: Option<String>,

    /// Required and must exist; checked against the database by the handler.
    pub store_id: Option<StoreId>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "The status field is required."),
        custom(function = "activity_status")
    )]
    pub status: Option<String>,

    /// Passwords are taken exactly as sent.
    #[validate(
        required(message = "The password field is required."),
        length(min = 8, message = "The password field must be at least 8 characters.")
    )]
    pub password: Option<String>,
}

/// Partial update: each supplied field obeys its create rule. `null` is
/// rejected on every field, including `password`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStaffRequest {
    #[serde(default, deserialize_with = "trimmed_patch")]
    #[validate(length(min = 2, message = "The name field must be at least 2 characters."))]
    pub name: Option<Option<String>>,

    #[serde(default, deserialize_with = "trimmed_patch")]
    #[validate(custom(function = "email_address"))]
    pub email: Option<Option<String>>,

    #[serde(default, deserialize_with = "trimmed_patch")]
    pub phone: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub store_id: Option<Option<StoreId>>,

    #[serde(default, deserialize_with = "trimmed_patch")]
    #[validate(custom(function = "activity_status"))]
    pub status: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(min = 8, message = "The password field must be at least 8 characters."))]
    pub password: Option<Option<String>>,
}

impl UpdateStaffRequest {
    fn errors(&self) -> FieldErrors {
        let mut errors = validation::check(self);
        errors.reject_null("name", self.name.as_ref());
        errors.reject_null("email", self.email.as_ref());
        errors.reject_null("phone", self.phone.as_ref());
        errors.reject_null("storeId", self.store_id.as_ref());
        errors.reject_null("status", self.status.as_ref());
        if matches!(self.password, Some(None)) {
            errors.add("password", "The password field must be a string.");
        }
        errors
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffJson {
    pub id: StaffId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub store_id: StoreId,
    pub status: ActivityStatus,
}

impl From<StaffMember> for StaffJson {
    fn from(member: StaffMember) -> Self {
        Self {
            id: member.id,
            name: member.name,
            email: member.email.into_inner(),
            phone: member.phone,
            store_id: member.store_id,
            status: member.status,
        }
    }
}

fn not_found_message(role: StaffRole) -> String {
    format!("{} not found", role_label(role))
}

fn staff_id(raw: &str, role: StaffRole) -> Result<StaffId> {
    parse_id(raw, &not_found_message(role))
}

// =============================================================================
// Database-backed Rules
// =============================================================================

/// `storeId` must reference an existing store.
async fn check_store(
    state: &AppState,
    store_id: Option<StoreId>,
    required_field: bool,
    errors: &mut FieldErrors,
) -> Result<()> {
    match store_id {
        None if required_field => errors.add("storeId", required_message("storeId")),
        None => {}
        Some(id) => {
            if !StoreRepository::new(state.pool()).exists(id).await? {
                errors.add("storeId", "The selected store id is invalid.");
            }
        }
    }
    Ok(())
}

/// `email` must not belong to any credential other than `except`.
async fn check_email_unique(
    state: &AppState,
    email: Option<&str>,
    except: Option<UserId>,
    errors: &mut FieldErrors,
) -> Result<()> {
    if errors.has("email") {
        return Ok(());
    }
    let Some(email) = email.and_then(|e| Email::parse(e).ok()) else {
        return Ok(());
    };
    if UserRepository::new(state.pool())
        .email_taken(&email, except)
        .await?
    {
        errors.add("email", "The email has already been taken.");
    }
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// List staff for the role, optionally searched and filtered by store.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Extension(role): Extension<StaffRole>,
    Query(query): Query<StaffQuery>,
) -> Result<Json<Vec<StaffJson>>> {
    let store_id = match query.store_id.as_deref().filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => match raw.parse::<StoreId>() {
            Ok(id) => Some(id),
            // No store has a non-numeric ID.
            Err(_) => return Ok(Json(Vec::new())),
        },
    };

    let filter = StaffFilter {
        search: query.search,
        store_id,
    };
    let staff = StaffRepository::new(state.pool(), role)
        .list(&filter)
        .await?;

    Ok(Json(staff.into_iter().map(StaffJson::from).collect()))
}

/// Create a staff member together with their login credential.
#[instrument(skip(state, request))]
pub async fn create(
    State(state): State<AppState>,
    Extension(role): Extension<StaffRole>,
    AppJson(request): AppJson<CreateStaffRequest>,
) -> Result<(StatusCode, Json<StaffJson>)> {
    let mut errors = validation::check(&request);
    check_email_unique(&state, request.email.as_deref(), None, &mut errors).await?;
    check_store(&state, request.store_id, true, &mut errors).await?;
    errors.into_result()?;

    let new = NewStaff {
        name: required(request.name, "name")?,
        email: parse_email(&required(request.email, "email")?)?,
        phone: required(request.phone, "phone")?,
        store_id: required(request.store_id, "storeId")?,
        status: parse_required(request.status.as_deref(), "status")?,
    };
    let password = required(request.password, "password")?;

    let member = StaffService::new(state.pool(), role)
        .create(&new, &password)
        .await?;

    Ok((StatusCode::CREATED, Json(member.into())))
}

/// Show one staff member.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Extension(role): Extension<StaffRole>,
    Path(id): Path<String>,
) -> Result<Json<StaffJson>> {
    let member = StaffRepository::new(state.pool(), role)
        .get(staff_id(&id, role)?)
        .await?
        .ok_or_else(|| AppError::not_found(not_found_message(role)))?;

    Ok(Json(member.into()))
}

/// Apply a partial update, keeping the linked credential in step.
#[instrument(skip(state, request))]
pub async fn update(
    State(state): State<AppState>,
    Extension(role): Extension<StaffRole>,
    Path(id): Path<String>,
    AppJson(request): AppJson<UpdateStaffRequest>,
) -> Result<Json<StaffJson>> {
    let id = staff_id(&id, role)?;

    let current = StaffRepository::new(state.pool(), role)
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(not_found_message(role)))?;

    let mut errors = request.errors();
    let email = request.email.flatten();
    let store_id = request.store_id.flatten();
    check_email_unique(&state, email.as_deref(), current.user_id, &mut errors).await?;
    check_store(&state, store_id, false, &mut errors).await?;
    errors.into_result()?;

    let changes = StaffChanges {
        name: request.name.flatten(),
        email: email.as_deref().map(parse_email).transpose()?,
        phone: request.phone.flatten(),
        store_id,
        status: parse_field(request.status.flatten().as_deref(), "status")?,
    };
    let password = request.password.flatten();

    let member = StaffService::new(state.pool(), role)
        .update(id, &changes, password.as_deref())
        .await?;

    Ok(Json(member.into()))
}

/// Delete a staff member. Their login credential is kept.
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Extension(role): Extension<StaffRole>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = staff_id(&id, role)?;

    StaffRepository::new(state.pool(), role)
        .delete(id)
        .await
        .map_err(|err| match err {
            RepositoryError::NotFound => AppError::not_found(not_found_message(role)),
            other => other.into(),
        })?;

    tracing::info!(role = %role, staff_id = %id, "Staff member deleted");

    Ok(message(&format!("{} deleted successfully", role_label(role))))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rules() {
        let request: CreateStaffRequest = serde_json::from_value(serde_json::json!({
            "name": "Jo",
            "email": "jo@store.com",
            "phone": "+1-555-1001",
            "storeId": "1",
            "status": "active",
            "password": "short",
        }))
        .unwrap();

        assert_eq!(request.store_id, Some(StoreId::new(1)));

        let errors = validation::check(&request);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("password").unwrap(),
            ["The password field must be at least 8 characters."]
        );
    }

    #[test]
    fn test_store_id_accepts_integer() {
        let request: UpdateStaffRequest =
            serde_json::from_value(serde_json::json!({ "storeId": 3 })).unwrap();
        assert_eq!(request.store_id, Some(Some(StoreId::new(3))));
        assert!(request.errors().is_empty());
    }

    #[test]
    fn test_update_rejects_explicit_null() {
        let request: UpdateStaffRequest = serde_json::from_value(serde_json::json!({
            "name": null,
            "storeId": null,
            "status": "",
            "password": null,
        }))
        .unwrap();

        let errors = request.errors();
        assert_eq!(errors.get("name").unwrap(), ["The name field is required."]);
        assert_eq!(errors.get("storeId").unwrap(), ["The store id field is required."]);
        assert_eq!(errors.get("status").unwrap(), ["The status field is required."]);
        assert_eq!(
            errors.get("password").unwrap(),
            ["The password field must be a string."]
        );
        assert!(!errors.has("email"));
    }

    #[test]
    fn test_update_password_rules() {
        let request: UpdateStaffRequest =
            serde_json::from_value(serde_json::json!({ "password": "short" })).unwrap();
        assert_eq!(
            request.errors().get("password").unwrap(),
            ["The password field must be at least 8 characters."]
        );

        let request: UpdateStaffRequest =
            serde_json::from_value(serde_json::json!({ "password": " spaced password " }))
                .unwrap();
        assert!(request.errors().is_empty());
        assert_eq!(request.password, Some(Some(" spaced password ".to_string())));
    }

    #[test]
    fn test_create_trims_strings() {
        let request: CreateStaffRequest = serde_json::from_value(serde_json::json!({
            "name": "  John Smith  ",
            "email": "john.smith@store.com",
            "phone": "   ",
            "storeId": 1,
            "status": "active",
            "password": "password123",
        }))
        .unwrap();

        let errors = validation::check(&request);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("phone").unwrap(), ["The phone field is required."]);
        assert_eq!(request.name.as_deref(), Some("John Smith"));
    }

    #[test]
    fn test_not_found_messages() {
        assert_eq!(
            not_found_message(StaffRole::StoreManager),
            "Store manager not found"
        );
        let err = staff_id("x", StaffRole::StoreRepresentative).unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Store representative not found"));
    }

    #[test]
    fn test_staff_json_shape() {
        use chrono::Utc;

        let member = StaffMember {
            id: StaffId::new(5),
            role: StaffRole::StoreRepresentative,
            name: "David Wilson".to_string(),
            email: Email::parse("david.wilson@store.com").unwrap(),
            phone: "+1-555-1005".to_string(),
            store_id: StoreId::new(3),
            user_id: None,
            status: ActivityStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(
            serde_json::to_value(StaffJson::from(member)).unwrap(),
            serde_json::json!({
                "id": "5",
                "name": "David Wilson",
                "email": "david.wilson@store.com",
                "phone": "+1-555-1005",
                "storeId": "3",
                "status": "active",
            })
        );
    }
}
