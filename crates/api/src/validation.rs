//! Request validation.
//!
//! Field rules are declared on request structs with the `validator` derive.
//! Rules that need other fields or the database (uniqueness, existence,
//! date ordering) are checked by handlers and added to the same
//! [`FieldErrors`] map, so clients always receive one shape:
//!
//! ```json
//! {
//!   "message": "The name field is required. (and 1 more error)",
//!   "errors": { "name": ["The name field is required."], "email": ["..."] }
//! }
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use storedesk_core::{ActivityStatus, Email, MetricType, PeriodType, TargetStatus};

use crate::error::AppError;

/// Validation messages keyed by request field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// An empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A map holding one message.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    /// Whether a field already has a message.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded for a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Record a required message when a partial update sends `null`.
    pub fn reject_null<T>(&mut self, field: &str, value: Option<&Option<T>>) {
        if matches!(value, Some(None)) && !self.has(field) {
            self.add(field, required_message(field));
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of messages across all fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// The first message, with a count of the rest.
    #[must_use]
    pub fn summary(&self) -> String {
        let Some(first) = self.0.values().flatten().next() else {
            return "The given data was invalid.".to_owned();
        };

        match self.len() - 1 {
            0 => first.clone(),
            1 => format!("{first} (and 1 more error)"),
            n => format!("{first} (and {n} more errors)"),
        }
    }

    /// `Ok` when empty, otherwise a 422 `AppError`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` when any message was recorded.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = Self::new();
        for (field, kind) in errors.into_errors() {
            // Request structs are flat; nested kinds never occur.
            let ValidationErrorsKind::Field(list) = kind else {
                continue;
            };
            for error in list {
                let message = error.message.map_or_else(
                    || format!("The {} field is invalid.", attribute_name(&field)),
                    Cow::into_owned,
                );
                out.add(&field, message);
            }
        }
        out
    }
}

/// Run a request's declared rules, collecting failures instead of
/// returning early so handlers can add their own checks to the same map.
#[must_use]
pub fn check<T: Validate>(request: &T) -> FieldErrors {
    request
        .validate()
        .map_or_else(FieldErrors::from, |()| FieldErrors::new())
}

/// Human-readable attribute name: `period_end` and `storeId` become
/// `period end` and `store id`.
#[must_use]
pub fn attribute_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 2);
    for c in field.chars() {
        if c == '_' {
            out.push(' ');
        } else if c.is_ascii_uppercase() {
            out.push(' ');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Message for a required field that was absent.
#[must_use]
pub fn required_message(field: &str) -> String {
    format!("The {} field is required.", attribute_name(field))
}

/// Unwrap a field the derive already checked as present.
///
/// # Errors
///
/// Returns a 422 naming the field if it is absent.
pub fn required<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::Validation(FieldErrors::single(field, required_message(field))))
}

/// Parse a field the derive already checked with one of the rules below.
///
/// # Errors
///
/// Returns a 422 naming the field if it does not parse.
pub fn parse_field<T: FromStr>(value: Option<&str>, field: &str) -> Result<Option<T>, AppError> {
    value
        .map(|v| {
            v.parse::<T>().map_err(|_| {
                AppError::Validation(FieldErrors::single(
                    field,
                    format!("The selected {} is invalid.", attribute_name(field)),
                ))
            })
        })
        .transpose()
}

/// [`parse_field`] for a field that must be present.
///
/// # Errors
///
/// Returns a 422 naming the field if it is absent or does not parse.
pub fn parse_required<T: FromStr>(value: Option<&str>, field: &str) -> Result<T, AppError> {
    required(parse_field(value, field)?, field)
}

/// Convert an email the derive already checked into an [`Email`].
///
/// # Errors
///
/// Returns a 422 on `email` if the address does not parse.
pub fn parse_email(value: &str) -> Result<Email, AppError> {
    Email::parse(value).map_err(|_| {
        AppError::Validation(FieldErrors::single(
            "email",
            "The email field must be a valid email address.",
        ))
    })
}

// =============================================================================
// Custom Rules
// =============================================================================

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn one_of<T: FromStr>(value: &str, message: &'static str) -> Result<(), ValidationError> {
    value
        .parse::<T>()
        .map(|_| ())
        .map_err(|_| invalid("in", message))
}

/// Email rule backed by [`Email::parse`].
///
/// # Errors
///
/// Returns a `ValidationError` for a malformed address.
pub fn email_address(value: &str) -> Result<(), ValidationError> {
    Email::parse(value)
        .map(|_| ())
        .map_err(|_| invalid("email", "The email field must be a valid email address."))
}

/// `status` must be `active` or `inactive`.
///
/// # Errors
///
/// Returns a `ValidationError` for any other value.
pub fn activity_status(value: &str) -> Result<(), ValidationError> {
    one_of::<ActivityStatus>(value, "The selected status is invalid.")
}

/// `status` must be `active`, `completed` or `cancelled`.
///
/// # Errors
///
/// Returns a `ValidationError` for any other value.
pub fn target_status(value: &str) -> Result<(), ValidationError> {
    one_of::<TargetStatus>(value, "The selected status is invalid.")
}

/// `metric_type` must be a known metric.
///
/// # Errors
///
/// Returns a `ValidationError` for any other value.
pub fn valid_metric_type(value: &str) -> Result<(), ValidationError> {
    one_of::<MetricType>(value, "The selected metric type is invalid.")
}

/// `period_type` must be a known cadence.
///
/// # Errors
///
/// Returns a `ValidationError` for any other value.
pub fn valid_period_type(value: &str) -> Result<(), ValidationError> {
    one_of::<PeriodType>(value, "The selected period type is invalid.")
}

/// `target_value` must not be negative.
///
/// # Errors
///
/// Returns a `ValidationError` for negative values.
pub fn non_negative_value(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid("min", "The target value field must be at least 0."));
    }
    Ok(())
}

// =============================================================================
// Serde Helpers
// =============================================================================

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_owned())
    }
}

/// Trim a string field. A blank string is treated as absent.
///
/// Use with `#[serde(default, deserialize_with = "trimmed")]`.
///
/// # Errors
///
/// Propagates the inner deserializer's error.
pub fn trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|value| value.and_then(non_blank))
}

/// [`double_option`] for trimmed strings. A blank string counts as `null`.
///
/// # Errors
///
/// Propagates the inner deserializer's error.
pub fn trimmed_patch<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    trimmed(deserializer).map(Some)
}

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
///
/// # Errors
///
/// Propagates the inner deserializer's error.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
