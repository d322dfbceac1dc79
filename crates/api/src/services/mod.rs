//! Business logic services.
//!
//! Services sit between route handlers and repositories: they own
//! transactions, password hashing and role resolution.

pub mod auth;
pub mod dashboard;
pub mod passcode;
pub mod staff;

pub use auth::{AuthError, AuthService, AuthenticatedUser, RoleAssignment};
pub use dashboard::{DashboardError, StoreMetrics, StoreOverview};
pub use passcode::PasscodeOutcome;
pub use staff::{StaffError, StaffService};
