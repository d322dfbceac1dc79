//! Domain models for the Storedesk API.
//!
//! These are validated domain objects, separate from the database row types
//! in `crate::db` and the JSON shapes in `crate::routes`.

pub mod staff;
pub mod store;
pub mod target;
pub mod user;

pub use staff::{NewStaff, StaffChanges, StaffFilter, StaffMember};
pub use store::{NewStore, Store, StoreChanges, StoreFilter};
pub use target::{NewTarget, StoreTarget, TargetChanges, TargetFilter};
pub use user::{AccessToken, User};
