//! Store target handlers, nested under a store.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{NaiveDate, SecondsFormat};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use storedesk_core::{MetricType, PeriodType, StoreId, StoreTargetId, TargetStatus};

use super::stores::STORE_NOT_FOUND;
use super::{message, parse_id};
use crate::db::{RepositoryError, StoreRepository, TargetRepository};
use crate::error::{AppError, Result};
use crate::extract::AppJson;
use crate::models::{NewTarget, StoreTarget, TargetChanges, TargetFilter};
use crate::state::AppState;
use crate::validation::{
    self, FieldErrors, double_option, non_negative_value, parse_field, parse_required, required,
    target_status, trimmed, trimmed_patch, valid_metric_type, valid_period_type,
};

const TARGET_NOT_FOUND: &str = "Target not found";
const PERIOD_END_AFTER: &str = "The period end field must be a date after period start.";

/// Build the targets router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stores/{store}/targets", get(index).post(create))
        .route(
            "/stores/{store}/targets/{target}",
            get(show).put(update).delete(destroy),
        )
}

// =============================================================================
// Request / Response Shapes
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTargetRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "The metric type field is required."),
        custom(function = "valid_metric_type")
    )]
    pub metric_type: Option<String>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "The period type field is required."),
        custom(function = "valid_period_type")
    )]
    pub period_type: Option<String>,

    #[validate(
        required(message = "The target value field is required."),
        custom(function = "non_negative_value")
    )]
    pub target_value: Option<Decimal>,

    #[validate(required(message = "The period start field is required."))]
    pub period_start: Option<NaiveDate>,

    pub period_end: Option<NaiveDate>,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        required(message = "The status field is required."),
        custom(function = "target_status")
    )]
    pub status: Option<String>,
}

/// Partial update. `period_end: null` clears the end date; `null` on any
/// other field is rejected.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTargetRequest {
    #[serde(default, deserialize_with = "trimmed_patch")]
    #[validate(custom(function = "valid_metric_type"))]
    pub metric_type: Option<Option<String>>,

    #[serde(default, deserialize_with = "trimmed_patch")]
    #[validate(custom(function = "valid_period_type"))]
    pub period_type: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(custom(function = "non_negative_value"))]
    pub target_value: Option<Option<Decimal>>,

    #[serde(default, deserialize_with = "double_option")]
    pub period_start: Option<Option<NaiveDate>>,

    #[serde(default, deserialize_with = "double_option")]
    pub period_end: Option<Option<NaiveDate>>,

    #[serde(default, deserialize_with = "trimmed_patch")]
    #[validate(custom(function = "target_status"))]
    pub status: Option<Option<String>>,
}

impl UpdateTargetRequest {
    fn errors(&self) -> FieldErrors {
        let mut errors = validation::check(self);
        errors.reject_null("metric_type", self.metric_type.as_ref());
        errors.reject_null("period_type", self.period_type.as_ref());
        errors.reject_null("target_value", self.target_value.as_ref());
        errors.reject_null("period_start", self.period_start.as_ref());
        errors.reject_null("status", self.status.as_ref());
        errors
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TargetQuery {
    pub period_type: Option<String>,
    pub metric_type: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TargetJson {
    pub id: StoreTargetId,
    pub store_id: StoreId,
    pub metric_type: MetricType,
    pub period_type: PeriodType,
    /// Always two decimal places, as a string.
    pub target_value: String,
    pub period_start: String,
    pub period_end: Option<String>,
    pub status: TargetStatus,
    pub created_at: String,
    pub updated_at: String,
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl From<StoreTarget> for TargetJson {
    fn from(target: StoreTarget) -> Self {
        let mut value = target.target_value;
        value.rescale(2);

        Self {
            id: target.id,
            store_id: target.store_id,
            metric_type: target.metric_type,
            period_type: target.period_type,
            target_value: value.to_string(),
            period_start: format_date(target.period_start),
            period_end: target.period_end.map(format_date),
            status: target.status,
            created_at: target.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            updated_at: target.updated_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Resolve the `{store}` path segment to an existing store.
async fn existing_store(state: &AppState, raw: &str) -> Result<StoreId> {
    let id = parse_id(raw, STORE_NOT_FOUND)?;
    if StoreRepository::new(state.pool()).exists(id).await? {
        Ok(id)
    } else {
        Err(AppError::not_found(STORE_NOT_FOUND))
    }
}

fn target_id(raw: &str) -> Result<StoreTargetId> {
    parse_id(raw, TARGET_NOT_FOUND)
}

fn not_found(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::not_found(TARGET_NOT_FOUND),
        other => other.into(),
    }
}

/// `period_end`, when set, must be strictly after `period_start`.
fn check_period(start: Option<NaiveDate>, end: Option<NaiveDate>, errors: &mut FieldErrors) {
    if matches!((start, end), (Some(start), Some(end)) if end <= start) {
        errors.add("period_end", PERIOD_END_AFTER);
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// List a store's targets, newest period first.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Path(store): Path<String>,
    Query(query): Query<TargetQuery>,
) -> Result<Json<Vec<TargetJson>>> {
    let store_id = existing_store(&state, &store).await?;

    let filter = TargetFilter {
        period_type: query.period_type,
        metric_type: query.metric_type,
        status: query.status,
    };
    let targets = TargetRepository::new(state.pool())
        .list(store_id, &filter)
        .await?;

    Ok(Json(targets.into_iter().map(TargetJson::from).collect()))
}

/// Create a target for a store.
#[instrument(skip(state, request))]
pub async fn create(
    State(state): State<AppState>,
    Path(store): Path<String>,
    AppJson(request): AppJson<CreateTargetRequest>,
) -> Result<(StatusCode, Json<TargetJson>)> {
    let store_id = existing_store(&state, &store).await?;

    let mut errors = validation::check(&request);
    check_period(request.period_start, request.period_end, &mut errors);
    errors.into_result()?;

    let new = NewTarget {
        metric_type: parse_required(request.metric_type.as_deref(), "metric_type")?,
        period_type: parse_required(request.period_type.as_deref(), "period_type")?,
        target_value: required(request.target_value, "target_value")?,
        period_start: required(request.period_start, "period_start")?,
        period_end: request.period_end,
        status: parse_required(request.status.as_deref(), "status")?,
    };

    let target = TargetRepository::new(state.pool())
        .create(store_id, &new)
        .await?;

    tracing::info!(store_id = %store_id, target_id = %target.id, "Target created");

    Ok((StatusCode::CREATED, Json(target.into())))
}

/// Show one target of a store.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path((store, target)): Path<(String, String)>,
) -> Result<Json<TargetJson>> {
    let store_id = existing_store(&state, &store).await?;

    let target = TargetRepository::new(state.pool())
        .get(store_id, target_id(&target)?)
        .await?
        .ok_or_else(|| AppError::not_found(TARGET_NOT_FOUND))?;

    Ok(Json(target.into()))
}

/// Apply a partial update to a target.
#[instrument(skip(state, request))]
pub async fn update(
    State(state): State<AppState>,
    Path((store, target)): Path<(String, String)>,
    AppJson(request): AppJson<UpdateTargetRequest>,
) -> Result<Json<TargetJson>> {
    let store_id = existing_store(&state, &store).await?;
    let id = target_id(&target)?;
    let repo = TargetRepository::new(state.pool());

    let current = repo
        .get(store_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(TARGET_NOT_FOUND))?;

    // Either date may change alone; compare the pair as it will be stored.
    let mut errors = request.errors();
    let period_start = request.period_start.flatten();
    if !errors.has("period_start") && (period_start.is_some() || request.period_end.is_some()) {
        check_period(
            Some(period_start.unwrap_or(current.period_start)),
            request.period_end.unwrap_or(current.period_end),
            &mut errors,
        );
    }
    errors.into_result()?;

    let changes = TargetChanges {
        metric_type: parse_field(request.metric_type.flatten().as_deref(), "metric_type")?,
        period_type: parse_field(request.period_type.flatten().as_deref(), "period_type")?,
        target_value: request.target_value.flatten(),
        period_start,
        period_end: request.period_end,
        status: parse_field(request.status.flatten().as_deref(), "status")?,
    };

    let target = repo.update(store_id, id, &changes).await.map_err(not_found)?;

    tracing::info!(store_id = %store_id, target_id = %target.id, "Target updated");

    Ok(Json(target.into()))
}

/// Delete a target.
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path((store, target)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>> {
    let store_id = existing_store(&state, &store).await?;
    let id = target_id(&target)?;

    TargetRepository::new(state.pool())
        .delete(store_id, id)
        .await
        .map_err(not_found)?;

    tracing::info!(store_id = %store_id, target_id = %id, "Target deleted");

    Ok(message("Target deleted successfully"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_end_must_follow_start() {
        let mut errors = FieldErrors::new();
        check_period(Some(date(2025, 1, 1)), Some(date(2025, 1, 1)), &mut errors);
        assert_eq!(errors.get("period_end").unwrap(), [PERIOD_END_AFTER]);

        let mut errors = FieldErrors::new();
        check_period(Some(date(2025, 1, 2)), Some(date(2025, 1, 1)), &mut errors);
        assert!(errors.has("period_end"));

        let mut errors = FieldErrors::new();
        check_period(Some(date(2025, 1, 1)), Some(date(2025, 1, 31)), &mut errors);
        check_period(Some(date(2025, 1, 1)), None, &mut errors);
        check_period(None, Some(date(2025, 1, 1)), &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_create_rules() {
        let request: CreateTargetRequest = serde_json::from_value(serde_json::json!({
            "metric_type": "profit",
            "period_type": "monthly",
            "target_value": -5,
            "period_start": "2025-01-01",
        }))
        .unwrap();

        let errors = validation::check(&request);
        assert_eq!(
            errors.get("metric_type").unwrap(),
            ["The selected metric type is invalid."]
        );
        assert_eq!(
            errors.get("target_value").unwrap(),
            ["The target value field must be at least 0."]
        );
        assert_eq!(errors.get("status").unwrap(), ["The status field is required."]);
        assert!(!errors.has("period_type"));
    }

    #[test]
    fn test_update_distinguishes_null_period_end() {
        let request: UpdateTargetRequest =
            serde_json::from_value(serde_json::json!({ "period_end": null })).unwrap();
        assert_eq!(request.period_end, Some(None));
        assert!(request.errors().is_empty());

        let request: UpdateTargetRequest =
            serde_json::from_value(serde_json::json!({ "status": "completed" })).unwrap();
        assert_eq!(request.period_end, None);
        assert!(request.errors().is_empty());
    }

    #[test]
    fn test_update_rejects_explicit_null() {
        let request: UpdateTargetRequest = serde_json::from_value(serde_json::json!({
            "metric_type": null,
            "target_value": null,
            "period_start": null,
            "status": " ",
        }))
        .unwrap();

        let errors = request.errors();
        assert_eq!(
            errors.get("metric_type").unwrap(),
            ["The metric type field is required."]
        );
        assert_eq!(
            errors.get("target_value").unwrap(),
            ["The target value field is required."]
        );
        assert_eq!(
            errors.get("period_start").unwrap(),
            ["The period start field is required."]
        );
        assert_eq!(errors.get("status").unwrap(), ["The status field is required."]);
        assert!(!errors.has("period_type"));
    }

    #[test]
    fn test_update_checks_supplied_values() {
        let request: UpdateTargetRequest = serde_json::from_value(serde_json::json!({
            "period_type": "hourly",
            "target_value": -1,
        }))
        .unwrap();

        let errors = request.errors();
        assert_eq!(
            errors.get("period_type").unwrap(),
            ["The selected period type is invalid."]
        );
        assert_eq!(
            errors.get("target_value").unwrap(),
            ["The target value field must be at least 0."]
        );
    }

    #[test]
    fn test_target_json_shape() {
        let created = Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap();
        let target = StoreTarget {
            id: StoreTargetId::new(9),
            store_id: StoreId::new(1),
            metric_type: MetricType::Revenue,
            period_type: PeriodType::Monthly,
            target_value: Decimal::new(5000, 0),
            period_start: date(2025, 1, 1),
            period_end: Some(date(2025, 1, 31)),
            status: TargetStatus::Active,
            created_at: created,
            updated_at: created,
        };

        assert_eq!(
            serde_json::to_value(TargetJson::from(target)).unwrap(),
            serde_json::json!({
                "id": "9",
                "store_id": "1",
                "metric_type": "revenue",
                "period_type": "monthly",
                "target_value": "5000.00",
                "period_start": "2025-01-01",
                "period_end": "2025-01-31",
                "status": "active",
                "created_at": "2025-01-15T09:30:00.000000Z",
                "updated_at": "2025-01-15T09:30:00.000000Z",
            })
        );
    }
}
