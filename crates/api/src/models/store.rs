//! Store domain types.

use chrono::{DateTime, Utc};

use storedesk_core::{ActivityStatus, Email, StoreId};

/// A physical retail location.
#[derive(Debug, Clone)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub address: String,
    pub phone: String,
    /// Contact address; several stores may share one.
    pub email: Email,
    pub status: ActivityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Store {
    /// Whole days elapsed since the store was created, as of `now`.
    ///
    /// A `created_at` in the future counts as zero days.
    #[must_use]
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_days().max(0)
    }
}

/// Fields for inserting a store.
#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: Email,
    pub status: ActivityStatus,
}

/// A partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct StoreChanges {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Email>,
    pub status: Option<ActivityStatus>,
}

/// Listing filter for stores.
#[derive(Debug, Clone, Default)]
pub struct StoreFilter {
    /// Substring matched against name, address and email.
    pub search: Option<String>,
    pub status: Option<ActivityStatus>,
}
