//! Store target domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use storedesk_core::{MetricType, PeriodType, StoreId, StoreTargetId, TargetStatus};

/// A numeric performance goal for a store over a period.
#[derive(Debug, Clone)]
pub struct StoreTarget {
    pub id: StoreTargetId,
    pub store_id: StoreId,
    pub metric_type: MetricType,
    pub period_type: PeriodType,
    /// Stored as `NUMERIC(15, 2)`.
    pub target_value: Decimal,
    pub period_start: NaiveDate,
    /// Strictly after `period_start` when present.
    pub period_end: Option<NaiveDate>,
    pub status: TargetStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a target.
#[derive(Debug, Clone)]
pub struct NewTarget {
    pub metric_type: MetricType,
    pub period_type: PeriodType,
    pub target_value: Decimal,
    pub period_start: NaiveDate,
    pub period_end: Option<NaiveDate>,
    pub status: TargetStatus,
}

/// A partial update.
///
/// `period_end` is doubly optional: `None` leaves it alone, `Some(None)`
/// clears it.
#[derive(Debug, Clone, Default)]
pub struct TargetChanges {
    pub metric_type: Option<MetricType>,
    pub period_type: Option<PeriodType>,
    pub target_value: Option<Decimal>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<Option<NaiveDate>>,
    pub status: Option<TargetStatus>,
}

/// Listing filter for targets; each field is an exact match.
///
/// Values are kept as raw strings so an unrecognised value simply matches
/// nothing.
#[derive(Debug, Clone, Default)]
pub struct TargetFilter {
    pub period_type: Option<String>,
    pub metric_type: Option<String>,
    pub status: Option<String>,
}
