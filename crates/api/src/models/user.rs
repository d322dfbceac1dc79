//! Credential user domain types.

use chrono::{DateTime, Utc};

use storedesk_core::{Email, TokenId, UserId};

/// A login credential.
///
/// Has no role column: the role is derived from the staff tables on each
/// login and `me` lookup.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A personal access token that authenticated the current request.
#[derive(Debug, Clone, Copy)]
pub struct AccessToken {
    pub id: TokenId,
    pub user_id: UserId,
}
