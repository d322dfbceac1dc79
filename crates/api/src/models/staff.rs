//! Staff domain types shared by store managers and store representatives.
//!
//! Both roles have the same shape and rules; `StaffRole` selects the table.

use chrono::{DateTime, Utc};

use storedesk_core::{ActivityStatus, Email, StaffId, StaffRole, StoreId, UserId};

/// A store manager or store representative.
#[derive(Debug, Clone)]
pub struct StaffMember {
    pub id: StaffId,
    pub role: StaffRole,
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub store_id: StoreId,
    /// Linked login credential, if any.
    pub user_id: Option<UserId>,
    pub status: ActivityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a staff record.
#[derive(Debug, Clone)]
pub struct NewStaff {
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub store_id: StoreId,
    pub status: ActivityStatus,
}

/// A partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct StaffChanges {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub store_id: Option<StoreId>,
    pub status: Option<ActivityStatus>,
}

/// Listing filter for staff.
#[derive(Debug, Clone, Default)]
pub struct StaffFilter {
    /// Substring matched against name, email and phone.
    pub search: Option<String>,
    pub store_id: Option<StoreId>,
}
